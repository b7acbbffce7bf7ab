//! Prompt selection and delivery.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tabletalk_types::error::RepositoryError;
use tabletalk_types::prompt::{DiscussionPrompt, PromptDelivery};

use crate::dispatch::ChatGateway;
use crate::replies;
use crate::repository::prompt::PromptStore;

/// Picks discussion prompts per chat and posts scheduled rounds.
pub struct PromptService<S> {
    store: Arc<S>,
    prompts: Vec<DiscussionPrompt>,
    cooldown: Duration,
}

impl<S: PromptStore> PromptService<S> {
    pub fn new(store: Arc<S>, prompts: Vec<DiscussionPrompt>, cooldown_days: i64) -> Self {
        Self {
            store,
            prompts,
            cooldown: Duration::days(cooldown_days),
        }
    }

    /// Choose the next prompt for a chat.
    ///
    /// Never-sent prompts win first, in catalog order. Otherwise the
    /// eligible prompt with the oldest last delivery wins; prompts still
    /// inside the cooldown are skipped entirely. `None` means every
    /// prompt is cooling down.
    pub async fn pick(
        &self,
        chat_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<DiscussionPrompt>, RepositoryError> {
        let sent: HashMap<String, DateTime<Utc>> =
            self.store.last_sent(chat_id).await?.into_iter().collect();

        let mut oldest: Option<(&DiscussionPrompt, DateTime<Utc>)> = None;
        for prompt in &self.prompts {
            match sent.get(&prompt.id) {
                None => return Ok(Some(prompt.clone())),
                Some(&at) if now - at >= self.cooldown => {
                    if oldest.is_none_or(|(_, t)| at < t) {
                        oldest = Some((prompt, at));
                    }
                }
                Some(_) => {}
            }
        }
        Ok(oldest.map(|(prompt, _)| prompt.clone()))
    }

    /// Post one round to every configured chat.
    ///
    /// Each chat is independent: selection or delivery failing for one
    /// chat never blocks the others, and a delivery that cannot be
    /// recorded still counts as sent.
    #[tracing::instrument(name = "prompt.round", skip(self, gateway), fields(chats = chats.len()))]
    pub async fn deliver_round<G: ChatGateway>(&self, chats: &[i64], gateway: &G) {
        for &chat_id in chats {
            let prompt = match self.pick(chat_id, Utc::now()).await {
                Ok(Some(prompt)) => prompt,
                Ok(None) => {
                    tracing::debug!(chat_id, "every prompt is cooling down, skipping chat");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(chat_id, %error, "prompt selection failed");
                    continue;
                }
            };

            if let Err(error) = gateway
                .send(chat_id, replies::discussion_prompt(&prompt))
                .await
            {
                tracing::warn!(chat_id, prompt_id = %prompt.id, %error, "prompt delivery failed");
                continue;
            }

            let delivery = PromptDelivery {
                chat_id,
                prompt_id: prompt.id.clone(),
                sent_at: Utc::now(),
            };
            if let Err(error) = self.store.record_delivery(&delivery).await {
                tracing::warn!(chat_id, prompt_id = %prompt.id, %error, "prompt delivery not recorded");
            }
        }
    }

    /// When the last round across all chats fired, if ever.
    pub async fn last_round(&self, chats: &[i64]) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let mut latest = None;
        for &chat_id in chats {
            for (_, sent_at) in self.store.last_sent(chat_id).await? {
                if latest.is_none_or(|t| sent_at > t) {
                    latest = Some(sent_at);
                }
            }
        }
        Ok(latest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::GatewayError;
    use std::sync::Mutex;
    use tabletalk_types::event::Reply;

    struct MemoryPromptStore {
        deliveries: Mutex<Vec<PromptDelivery>>,
        fail_reads: bool,
    }

    impl MemoryPromptStore {
        fn new() -> Self {
            Self {
                deliveries: Mutex::new(Vec::new()),
                fail_reads: false,
            }
        }

        fn with(deliveries: Vec<PromptDelivery>) -> Self {
            Self {
                deliveries: Mutex::new(deliveries),
                fail_reads: false,
            }
        }
    }

    impl PromptStore for MemoryPromptStore {
        async fn record_delivery(&self, delivery: &PromptDelivery) -> Result<(), RepositoryError> {
            self.deliveries.lock().unwrap().push(delivery.clone());
            Ok(())
        }

        async fn last_sent(
            &self,
            chat_id: i64,
        ) -> Result<Vec<(String, DateTime<Utc>)>, RepositoryError> {
            if self.fail_reads {
                return Err(RepositoryError::Connection);
            }
            let mut latest: HashMap<String, DateTime<Utc>> = HashMap::new();
            for delivery in self.deliveries.lock().unwrap().iter() {
                if delivery.chat_id != chat_id {
                    continue;
                }
                let entry = latest
                    .entry(delivery.prompt_id.clone())
                    .or_insert(delivery.sent_at);
                if delivery.sent_at > *entry {
                    *entry = delivery.sent_at;
                }
            }
            Ok(latest.into_iter().collect())
        }
    }

    struct RecordingGateway {
        sent: Mutex<Vec<(i64, Reply)>>,
        fail: bool,
    }

    impl RecordingGateway {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    impl ChatGateway for RecordingGateway {
        async fn send(&self, chat_id: i64, reply: Reply) -> Result<(), GatewayError> {
            if self.fail {
                return Err(GatewayError("wire unplugged".to_string()));
            }
            self.sent.lock().unwrap().push((chat_id, reply));
            Ok(())
        }

        async fn is_admin(&self, _chat_id: i64, _user_id: i64) -> bool {
            false
        }
    }

    fn prompts() -> Vec<DiscussionPrompt> {
        vec![
            DiscussionPrompt::new("a", "Question A?"),
            DiscussionPrompt::new("b", "Question B?"),
            DiscussionPrompt::new("c", "Question C?"),
        ]
    }

    fn delivery(chat_id: i64, prompt_id: &str, days_ago: i64) -> PromptDelivery {
        PromptDelivery {
            chat_id,
            prompt_id: prompt_id.to_string(),
            sent_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[tokio::test]
    async fn never_sent_prompts_win_in_catalog_order() {
        let store = Arc::new(MemoryPromptStore::with(vec![delivery(-1, "a", 30)]));
        let service = PromptService::new(store, prompts(), 7);

        let picked = service.pick(-1, Utc::now()).await.unwrap().unwrap();
        assert_eq!(picked.id, "b");
    }

    #[tokio::test]
    async fn oldest_eligible_prompt_wins_when_all_sent() {
        let store = Arc::new(MemoryPromptStore::with(vec![
            delivery(-1, "a", 10),
            delivery(-1, "b", 30),
            delivery(-1, "c", 20),
        ]));
        let service = PromptService::new(store, prompts(), 7);

        let picked = service.pick(-1, Utc::now()).await.unwrap().unwrap();
        assert_eq!(picked.id, "b");
    }

    #[tokio::test]
    async fn cooling_down_prompts_are_skipped() {
        let store = Arc::new(MemoryPromptStore::with(vec![
            delivery(-1, "a", 2),
            delivery(-1, "b", 30),
            delivery(-1, "c", 3),
        ]));
        let service = PromptService::new(store, prompts(), 7);

        let picked = service.pick(-1, Utc::now()).await.unwrap().unwrap();
        assert_eq!(picked.id, "b");
    }

    #[tokio::test]
    async fn all_cooling_down_yields_none() {
        let store = Arc::new(MemoryPromptStore::with(vec![
            delivery(-1, "a", 1),
            delivery(-1, "b", 2),
            delivery(-1, "c", 3),
        ]));
        let service = PromptService::new(store, prompts(), 7);

        assert!(service.pick(-1, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_is_tracked_per_chat() {
        let store = Arc::new(MemoryPromptStore::with(vec![
            delivery(-1, "a", 1),
            delivery(-1, "b", 1),
            delivery(-1, "c", 1),
        ]));
        let service = PromptService::new(store, prompts(), 7);

        // Chat -2 has no history, so the first catalog prompt is fresh.
        let picked = service.pick(-2, Utc::now()).await.unwrap().unwrap();
        assert_eq!(picked.id, "a");
    }

    #[tokio::test]
    async fn round_delivers_and_records_per_chat() {
        let store = Arc::new(MemoryPromptStore::new());
        let service = PromptService::new(Arc::clone(&store), prompts(), 7);
        let gateway = RecordingGateway::new();

        service.deliver_round(&[-1, -2], &gateway).await;

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, -1);
        assert!(sent[0].1.text.contains("Question A?"));

        let recorded = store.deliveries.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert!(recorded.iter().all(|d| d.prompt_id == "a"));
    }

    #[tokio::test]
    async fn failed_delivery_is_not_recorded() {
        let store = Arc::new(MemoryPromptStore::new());
        let service = PromptService::new(Arc::clone(&store), prompts(), 7);
        let gateway = RecordingGateway {
            fail: true,
            ..RecordingGateway::new()
        };

        service.deliver_round(&[-1], &gateway).await;

        assert!(store.deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn selection_failure_skips_the_chat() {
        let store = Arc::new(MemoryPromptStore {
            fail_reads: true,
            ..MemoryPromptStore::new()
        });
        let service = PromptService::new(store, prompts(), 7);
        let gateway = RecordingGateway::new();

        service.deliver_round(&[-1], &gateway).await;

        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn last_round_reports_latest_delivery() {
        let store = Arc::new(MemoryPromptStore::with(vec![
            delivery(-1, "a", 10),
            delivery(-2, "b", 3),
        ]));
        let service = PromptService::new(store, prompts(), 7);

        let last = service.last_round(&[-1, -2]).await.unwrap().unwrap();
        assert!(last > Utc::now() - Duration::days(4));

        let service_empty = PromptService::new(
            Arc::new(MemoryPromptStore::new()),
            prompts(),
            7,
        );
        assert!(service_empty.last_round(&[-1]).await.unwrap().is_none());
    }
}
