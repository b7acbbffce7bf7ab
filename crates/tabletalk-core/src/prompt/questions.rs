//! The discussion question catalog.

use tabletalk_types::config::PromptsConfig;
use tabletalk_types::prompt::DiscussionPrompt;

/// The built-in question list, in rotation order.
pub fn built_in() -> Vec<DiscussionPrompt> {
    vec![
        DiscussionPrompt::new(
            "game-of-week",
            "What was the best game you played this week?",
        ),
        DiscussionPrompt::new(
            "new-to-table",
            "Did any new game hit your table recently? First impressions?",
        ),
        DiscussionPrompt::new(
            "underrated",
            "Which game deserves way more love than it gets?",
        ),
        DiscussionPrompt::new(
            "shelf-of-shame",
            "What has been sitting unplayed on your shelf the longest?",
        ),
        DiscussionPrompt::new(
            "two-player",
            "What's your favorite game at exactly two players?",
        ),
        DiscussionPrompt::new(
            "mechanic-love",
            "Which mechanic instantly sells you on a game?",
        ),
        DiscussionPrompt::new(
            "mechanic-pass",
            "Which mechanic makes you put a box straight back on the shelf?",
        ),
        DiscussionPrompt::new(
            "grail-game",
            "What's your current grail game, and what's keeping you from it?",
        ),
        DiscussionPrompt::new(
            "house-rules",
            "Do you play any house rules that genuinely improve a published game?",
        ),
        DiscussionPrompt::new(
            "teaching",
            "What's the hardest game you've ever had to teach, and how did it go?",
        ),
        DiscussionPrompt::new(
            "campaigns",
            "Campaign games: committed fan, or never again?",
        ),
        DiscussionPrompt::new(
            "next-night",
            "What should land on the table at the next game night?",
        ),
    ]
}

/// The active catalog: configured questions when present, otherwise the
/// built-in list. Configured questions get stable ids from their position.
pub fn from_config(config: &PromptsConfig) -> Vec<DiscussionPrompt> {
    if config.questions.is_empty() {
        return built_in();
    }
    config
        .questions
        .iter()
        .enumerate()
        .map(|(i, text)| DiscussionPrompt::new(format!("custom-{}", i + 1), text))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
