//! Application state wiring config, storage, and services together.
//!
//! `AppState` holds what every command needs up front: the parsed config,
//! the data directory, and the SQLite stores. The LLM-backed services are
//! built on demand through the helper methods, so commands that never call
//! the model (`status`, `completions`) run without an API key in the
//! environment.

use std::path::PathBuf;
use std::sync::Arc;

use tabletalk_core::access::AccessPolicy;
use tabletalk_core::catalog::CatalogService;
use tabletalk_core::dispatch::Dispatcher;
use tabletalk_core::prompt::{questions, PromptService};
use tabletalk_core::summary::SummaryService;
use tabletalk_infra::catalog::HttpCatalogClient;
use tabletalk_infra::config::{load_config, resolve_data_dir};
use tabletalk_infra::llm::{build_provider, AnyProvider};
use tabletalk_infra::secret;
use tabletalk_infra::sqlite::catalog::SqliteCatalogStore;
use tabletalk_infra::sqlite::message::SqliteMessageStore;
use tabletalk_infra::sqlite::pool::DatabasePool;
use tabletalk_infra::sqlite::prompt::SqlitePromptStore;
use tabletalk_types::config::BotConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteCatalogService =
    CatalogService<HttpCatalogClient, SqliteCatalogStore, AnyProvider>;

pub type ConcreteDispatcher =
    Dispatcher<SqliteMessageStore, HttpCatalogClient, SqliteCatalogStore, AnyProvider>;

pub type ConcretePromptService = PromptService<SqlitePromptStore>;

/// Shared application state holding config and storage.
pub struct AppState {
    pub config: BotConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    pub messages: Arc<SqliteMessageStore>,
    pub catalog_store: Arc<SqliteCatalogStore>,
    pub prompt_store: Arc<SqlitePromptStore>,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("tabletalk.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        Ok(Self {
            config,
            data_dir,
            db_pool: db_pool.clone(),
            messages: Arc::new(SqliteMessageStore::new(db_pool.clone())),
            catalog_store: Arc::new(SqliteCatalogStore::new(db_pool.clone())),
            prompt_store: Arc::new(SqlitePromptStore::new(db_pool)),
        })
    }

    /// Build the configured LLM provider, reading its API key from the
    /// environment. Fails when the key variable is absent.
    pub fn llm_provider(&self) -> anyhow::Result<Arc<AnyProvider>> {
        let api_key = secret::llm_api_key(self.config.llm.provider)?;
        Ok(Arc::new(build_provider(&self.config.llm, api_key)))
    }

    /// Wire the catalog lookup service around the given provider.
    pub fn catalog_service(&self, provider: Arc<AnyProvider>) -> ConcreteCatalogService {
        let client = Arc::new(HttpCatalogClient::new(&self.config.catalog));
        CatalogService::new(
            client,
            Arc::clone(&self.catalog_store),
            provider,
            &self.config.catalog,
            &self.config.llm,
        )
    }

    /// Wire the full message dispatcher around the given provider.
    ///
    /// `bot_username` is the platform handle learned at connect time; it
    /// lets the command parser ignore commands addressed to other bots.
    pub fn dispatcher(
        &self,
        provider: Arc<AnyProvider>,
        bot_username: Option<String>,
    ) -> ConcreteDispatcher {
        let policy = AccessPolicy::from_config(&self.config.access);
        let summarizer = SummaryService::new(Arc::clone(&provider), &self.config.llm);
        let catalog = self.catalog_service(provider);

        let mut dispatcher = Dispatcher::new(
            policy,
            Arc::clone(&self.messages),
            summarizer,
            catalog,
            self.config.summary.max_window_hours,
        );
        if let Some(username) = bot_username {
            dispatcher = dispatcher.with_bot_username(username);
        }
        dispatcher
    }

    /// Wire the discussion-prompt rotation service.
    pub fn prompt_service(&self) -> ConcretePromptService {
        let prompts = questions::from_config(&self.config.prompts);
        PromptService::new(
            Arc::clone(&self.prompt_store),
            prompts,
            self.config.prompts.cooldown_days,
        )
    }
}
