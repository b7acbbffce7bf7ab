//! Parsing slash commands out of incoming message text.

/// A recognized bot command with its raw arguments.
///
/// Argument validation happens in the dispatcher, not here: `/summary abc`
/// parses as `Summary { hours: Some("abc") }` so the handler can reply
/// with a usage hint instead of the message being silently recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Summary { hours: Option<String> },
    Since { time: Option<String> },
    Stats,
    Game { name: String },
    PurgeAll,
    PurgeRange { args: Vec<String> },
}

/// Parse the leading slash command from a message, if any.
///
/// Telegram group clients append `@botname` to commands when several bots
/// share a chat; a suffix naming a different bot means the command is not
/// ours and parses as `None`. Unrecognized commands also parse as `None`
/// -- the dispatcher ignores them rather than replying.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let mut words = text.trim().split_whitespace();
    let first = words.next()?;
    let name = first.strip_prefix('/')?;
    if name.is_empty() {
        return None;
    }

    let (name, target) = match name.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (name, None),
    };
    if let (Some(target), Some(own)) = (target, bot_username) {
        if !target.eq_ignore_ascii_case(own) {
            return None;
        }
    }

    match name.to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "summary" => Some(Command::Summary {
            hours: words.next().map(str::to_string),
        }),
        "since" => Some(Command::Since {
            time: words.next().map(str::to_string),
        }),
        "stats" => Some(Command::Stats),
        "game" => Some(Command::Game {
            name: words.collect::<Vec<_>>().join(" "),
        }),
        "purge_all" => Some(Command::PurgeAll),
        "purge_range" => Some(Command::PurgeRange {
            args: words.map(str::to_string).collect(),
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_command("/start", None), Some(Command::Start));
        assert_eq!(parse_command("/help", None), Some(Command::Help));
        assert_eq!(parse_command("/stats", None), Some(Command::Stats));
        assert_eq!(parse_command("/purge_all", None), Some(Command::PurgeAll));
    }

    #[test]
    fn parses_summary_argument() {
        assert_eq!(
            parse_command("/summary 6", None),
            Some(Command::Summary {
                hours: Some("6".to_string())
            })
        );
        assert_eq!(
            parse_command("/summary", None),
            Some(Command::Summary { hours: None })
        );
    }

    #[test]
    fn keeps_invalid_arguments_for_the_handler() {
        assert_eq!(
            parse_command("/summary abc", None),
            Some(Command::Summary {
                hours: Some("abc".to_string())
            })
        );
    }

    #[test]
    fn game_name_spans_multiple_words() {
        assert_eq!(
            parse_command("/game Brass: Birmingham", None),
            Some(Command::Game {
                name: "Brass: Birmingham".to_string()
            })
        );
        assert_eq!(
            parse_command("/game", None),
            Some(Command::Game {
                name: String::new()
            })
        );
    }

    #[test]
    fn purge_range_collects_both_dates() {
        assert_eq!(
            parse_command("/purge_range 2026-01-01 2026-01-31", None),
            Some(Command::PurgeRange {
                args: vec!["2026-01-01".to_string(), "2026-01-31".to_string()]
            })
        );
    }

    #[test]
    fn accepts_commands_addressed_to_us() {
        assert_eq!(
            parse_command("/summary@TableTalkBot 6", Some("TableTalkBot")),
            Some(Command::Summary {
                hours: Some("6".to_string())
            })
        );
        assert_eq!(
            parse_command("/stats@tabletalkbot", Some("TableTalkBot")),
            Some(Command::Stats)
        );
    }

    #[test]
    fn ignores_commands_addressed_to_other_bots() {
        assert_eq!(
            parse_command("/summary@SomeOtherBot 6", Some("TableTalkBot")),
            None
        );
    }

    #[test]
    fn ignores_unknown_commands_and_plain_text() {
        assert_eq!(parse_command("/frobnicate", None), None);
        assert_eq!(parse_command("good morning", None), None);
        assert_eq!(parse_command("/", None), None);
        assert_eq!(parse_command("", None), None);
    }
}
