//! Discussion prompt history trait definition.

use chrono::{DateTime, Utc};
use tabletalk_types::error::RepositoryError;
use tabletalk_types::prompt::PromptDelivery;

/// Repository trait for the discussion prompt delivery log.
///
/// The log is what keeps scheduled prompts from repeating: the selection
/// service reads the last send time per prompt and skips anything still
/// inside its cooldown.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait PromptStore: Send + Sync {
    /// Append one delivery to the log.
    fn record_delivery(
        &self,
        delivery: &PromptDelivery,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Most recent send time per prompt id for a chat.
    fn last_sent(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<(String, DateTime<Utc>)>, RepositoryError>> + Send;
}
