//! Parsing catalog XML responses.
//!
//! The catalog speaks the BGG XML API2 dialect: search results are a flat
//! `<items>` list, details come as one `<item>` with attribute-carried
//! values (`<minplayers value="2"/>`), a player-count poll, typed
//! `<link>` elements, and a `<statistics>` subtree.

use roxmltree::{Document, Node};
use tabletalk_types::error::CatalogError;

/// How many community-voted player counts to keep.
pub const MAX_BEST_COUNTS: usize = 3;

/// How many mechanics to keep from the details page.
pub const MAX_MECHANICS: usize = 5;

/// Width passed to the HTML renderer. Lines get re-flowed afterwards, so
/// the value only has to be wide enough not to mangle words.
const RENDER_WIDTH: usize = 200;

/// Everything we extract from one details page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGame {
    pub name: String,
    pub year: Option<i32>,
    pub image_url: Option<String>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    /// Highest "Best" tally first, ties in document order, at most
    /// `MAX_BEST_COUNTS`. Values verbatim from the poll ("4+" stays "4+").
    pub best_player_counts: Vec<String>,
    pub playtime_minutes: Option<u32>,
    pub weight: Option<f64>,
    pub rank: Option<u32>,
    pub mechanics: Vec<String>,
    /// Raw description, HTML and all. Clean with [`clean_description`].
    pub description: String,
}

/// The id of the first search hit, or `None` when the catalog found
/// nothing.
pub fn first_search_hit(xml: &str) -> Result<Option<i64>, CatalogError> {
    let doc = Document::parse(xml).map_err(|e| CatalogError::Parse(e.to_string()))?;
    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("item"))
        .find_map(|n| n.attribute("id").and_then(|id| id.parse().ok())))
}

/// Parse a details page. `Ok(None)` when the response carries no item,
/// which the catalog uses for ids that have vanished.
pub fn parse_details(xml: &str) -> Result<Option<ParsedGame>, CatalogError> {
    let doc = Document::parse(xml).map_err(|e| CatalogError::Parse(e.to_string()))?;
    let Some(item) = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("item"))
    else {
        return Ok(None);
    };

    let name = primary_name(item)
        .ok_or_else(|| CatalogError::Parse("details item has no name".to_string()))?;

    Ok(Some(ParsedGame {
        name: name.to_string(),
        year: child_value(item, "yearpublished").and_then(parse_positive_i32),
        image_url: child_text(item, "image").map(str::to_string),
        min_players: child_value(item, "minplayers").and_then(parse_positive_u32),
        max_players: child_value(item, "maxplayers").and_then(parse_positive_u32),
        best_player_counts: best_player_counts(item),
        playtime_minutes: child_value(item, "playingtime").and_then(parse_positive_u32),
        weight: average_weight(item),
        rank: overall_rank(item),
        mechanics: mechanics(item),
        description: child_text(item, "description").unwrap_or_default().to_string(),
    }))
}

/// Strip markup and entities from a raw description and re-flow it into a
/// single line of plain prose.
pub fn clean_description(raw: &str) -> String {
    let rendered = html2text::from_read(raw.as_bytes(), RENDER_WIDTH).unwrap_or_default();
    rendered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn primary_name<'a>(item: Node<'a, '_>) -> Option<&'a str> {
    let mut names = item.children().filter(|n| n.has_tag_name("name"));
    let mut first = None;
    for name in names.by_ref() {
        if name.attribute("type") == Some("primary") {
            return name.attribute("value");
        }
        if first.is_none() {
            first = name.attribute("value");
        }
    }
    first
}

fn child_value<'a>(item: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    item.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.attribute("value"))
}

fn child_text<'a>(item: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    item.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
}

fn parse_positive_u32(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

fn parse_positive_i32(value: &str) -> Option<i32> {
    value.parse::<i32>().ok().filter(|v| *v != 0)
}

fn average_weight(item: Node<'_, '_>) -> Option<f64> {
    item.descendants()
        .find(|n| n.has_tag_name("averageweight"))
        .and_then(|n| n.attribute("value"))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|w| *w > 0.0)
}

/// The overall rank from the `<ranks>` subtree. The catalog reports
/// unranked games with the literal value "Not Ranked", which maps to
/// `None` rather than any numeric placeholder.
fn overall_rank(item: Node<'_, '_>) -> Option<u32> {
    item.descendants()
        .filter(|n| n.has_tag_name("rank"))
        .find(|n| n.attribute("name") == Some("boardgame"))
        .and_then(|n| n.attribute("value"))
        .and_then(|v| v.parse::<u32>().ok())
}

fn mechanics(item: Node<'_, '_>) -> Vec<String> {
    item.children()
        .filter(|n| n.has_tag_name("link"))
        .filter(|n| n.attribute("type") == Some("boardgamemechanic"))
        .filter_map(|n| n.attribute("value"))
        .take(MAX_MECHANICS)
        .map(str::to_string)
        .collect()
}

/// Player counts ranked by "Best" votes from the suggested-player poll.
/// Counts with zero "Best" votes are dropped; ties keep poll order.
fn best_player_counts(item: Node<'_, '_>) -> Vec<String> {
    let Some(poll) = item
        .children()
        .find(|n| n.has_tag_name("poll") && n.attribute("name") == Some("suggested_numplayers"))
    else {
        return Vec::new();
    };

    let mut tallies: Vec<(String, u32)> = Vec::new();
    for results in poll.children().filter(|n| n.has_tag_name("results")) {
        let Some(count) = results.attribute("numplayers") else {
            continue;
        };
        let votes = results
            .children()
            .find(|n| n.has_tag_name("result") && n.attribute("value") == Some("Best"))
            .and_then(|n| n.attribute("numvotes"))
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        if votes > 0 {
            tallies.push((count.to_string(), votes));
        }
    }

    // sort_by is stable, so equal tallies keep document order.
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies
        .into_iter()
        .take(MAX_BEST_COUNTS)
        .map(|(count, _)| count)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_TWO_HITS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="2">
    <item type="boardgame" id="224517">
        <name type="primary" value="Brass: Birmingham"/>
        <yearpublished value="2018"/>
    </item>
    <item type="boardgame" id="28720">
        <name type="primary" value="Brass: Lancashire"/>
        <yearpublished value="2007"/>
    </item>
</items>"#;

    const SEARCH_EMPTY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="0"/>"#;

    const DETAILS_FULL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items>
    <item type="boardgame" id="224517">
        <thumbnail>https://example.test/thumb.jpg</thumbnail>
        <image>https://example.test/box.jpg</image>
        <name type="primary" sortindex="1" value="Brass: Birmingham"/>
        <name type="alternate" sortindex="1" value="Brass: Birmingem"/>
        <description>Brass: Birmingham is an economic strategy game.&#10;It tells the story of competing entrepreneurs.</description>
        <yearpublished value="2018"/>
        <minplayers value="2"/>
        <maxplayers value="4"/>
        <poll name="suggested_numplayers" title="User Suggested Number of Players" totalvotes="600">
            <results numplayers="2">
                <result value="Best" numvotes="120"/>
                <result value="Recommended" numvotes="300"/>
                <result value="Not Recommended" numvotes="40"/>
            </results>
            <results numplayers="3">
                <result value="Best" numvotes="410"/>
                <result value="Recommended" numvotes="150"/>
                <result value="Not Recommended" numvotes="5"/>
            </results>
            <results numplayers="4">
                <result value="Best" numvotes="280"/>
                <result value="Recommended" numvotes="200"/>
                <result value="Not Recommended" numvotes="20"/>
            </results>
            <results numplayers="4+">
                <result value="Best" numvotes="0"/>
                <result value="Recommended" numvotes="3"/>
                <result value="Not Recommended" numvotes="400"/>
            </results>
        </poll>
        <playingtime value="120"/>
        <link type="boardgamecategory" id="1021" value="Economic"/>
        <link type="boardgamemechanic" id="2040" value="Hand Management"/>
        <link type="boardgamemechanic" id="2081" value="Network Building"/>
        <link type="boardgamemechanic" id="2004" value="Income"/>
        <link type="boardgamemechanic" id="2875" value="End Game Bonuses"/>
        <link type="boardgamemechanic" id="2940" value="Loans"/>
        <link type="boardgamemechanic" id="2959" value="Market"/>
        <statistics page="1">
            <ratings>
                <average value="8.59"/>
                <ranks>
                    <rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="3" bayesaverage="8.41"/>
                    <rank type="family" id="5497" name="strategygames" friendlyname="Strategy Game Rank" value="2" bayesaverage="8.44"/>
                </ranks>
                <averageweight value="3.8652"/>
            </ratings>
        </statistics>
    </item>
</items>"#;

    const DETAILS_UNRANKED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items>
    <item type="boardgame" id="999999">
        <name type="primary" value="Obscure Prototype"/>
        <description>Short.</description>
        <yearpublished value="0"/>
        <minplayers value="0"/>
        <maxplayers value="0"/>
        <playingtime value="0"/>
        <statistics page="1">
            <ratings>
                <ranks>
                    <rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="Not Ranked" bayesaverage="Not Ranked"/>
                </ranks>
                <averageweight value="0"/>
            </ratings>
        </statistics>
    </item>
</items>"#;

    const DETAILS_NO_ITEM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items/>"#;

    #[test]
    fn search_returns_first_hit_id() {
        assert_eq!(first_search_hit(SEARCH_TWO_HITS).unwrap(), Some(224517));
    }

    #[test]
    fn search_with_no_items_returns_none() {
        assert_eq!(first_search_hit(SEARCH_EMPTY).unwrap(), None);
    }

    #[test]
    fn search_rejects_malformed_xml() {
        let err = first_search_hit("<items><item id=").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn details_extracts_all_fields() {
        let game = parse_details(DETAILS_FULL).unwrap().unwrap();
        assert_eq!(game.name, "Brass: Birmingham");
        assert_eq!(game.year, Some(2018));
        assert_eq!(game.image_url.as_deref(), Some("https://example.test/box.jpg"));
        assert_eq!(game.min_players, Some(2));
        assert_eq!(game.max_players, Some(4));
        assert_eq!(game.playtime_minutes, Some(120));
        assert_eq!(game.weight, Some(3.8652));
        assert_eq!(game.rank, Some(3));
        assert!(game.description.starts_with("Brass: Birmingham is an economic"));
    }

    #[test]
    fn details_prefers_primary_name() {
        let game = parse_details(DETAILS_FULL).unwrap().unwrap();
        assert_eq!(game.name, "Brass: Birmingham");
    }

    #[test]
    fn best_counts_are_ranked_by_votes_and_skip_zero() {
        let game = parse_details(DETAILS_FULL).unwrap().unwrap();
        // 3 (410) > 4 (280) > 2 (120); "4+" polled zero Best votes.
        assert_eq!(game.best_player_counts, vec!["3", "4", "2"]);
    }

    #[test]
    fn mechanics_are_capped() {
        let game = parse_details(DETAILS_FULL).unwrap().unwrap();
        assert_eq!(game.mechanics.len(), MAX_MECHANICS);
        assert_eq!(game.mechanics[0], "Hand Management");
        assert!(!game.mechanics.contains(&"Market".to_string()));
        assert!(!game.mechanics.contains(&"Economic".to_string()));
    }

    #[test]
    fn unranked_and_zero_values_map_to_none() {
        let game = parse_details(DETAILS_UNRANKED).unwrap().unwrap();
        assert_eq!(game.rank, None);
        assert_eq!(game.year, None);
        assert_eq!(game.min_players, None);
        assert_eq!(game.max_players, None);
        assert_eq!(game.playtime_minutes, None);
        assert_eq!(game.weight, None);
        assert!(game.best_player_counts.is_empty());
        assert!(game.mechanics.is_empty());
    }

    #[test]
    fn details_without_item_is_none() {
        assert_eq!(parse_details(DETAILS_NO_ITEM).unwrap(), None);
    }

    #[test]
    fn tied_best_votes_keep_poll_order() {
        let xml = r#"<items><item type="boardgame" id="1">
            <name type="primary" value="Tie Game"/>
            <poll name="suggested_numplayers">
                <results numplayers="2"><result value="Best" numvotes="50"/></results>
                <results numplayers="3"><result value="Best" numvotes="50"/></results>
                <results numplayers="5"><result value="Best" numvotes="50"/></results>
                <results numplayers="6"><result value="Best" numvotes="50"/></results>
            </poll>
        </item></items>"#;
        let game = parse_details(xml).unwrap().unwrap();
        assert_eq!(game.best_player_counts, vec!["2", "3", "5"]);
    }

    #[test]
    fn clean_description_strips_markup_and_reflows() {
        // What roxmltree hands us: XML-decoded once, HTML entities intact.
        let cleaned = clean_description(
            "An &quot;engine builder&quot; at heart.&#10;&#10;Build networks   and develop industries.",
        );
        assert!(!cleaned.contains('\n'));
        assert!(!cleaned.contains("&quot;"));
        assert!(!cleaned.contains("  "));
        assert!(cleaned.contains("engine builder"));
        assert!(cleaned.contains("Build networks and develop industries."));
    }
}
