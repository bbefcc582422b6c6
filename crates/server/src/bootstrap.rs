use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use metrobot_agent::{GroqClient, LlmClient, LlmError, OrderAgent};
use metrobot_core::catalog::ProductCatalog;
use metrobot_core::config::{AppConfig, ConfigError, LoadOptions};
use metrobot_core::session::SessionStore;
use metrobot_db::{connect, migrations, ConversationLog, DbPool, OrderStore, SqlOrderStore};

use crate::{chat, health, orders, web};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

/// Everything a request handler needs, constructed once at bootstrap and
/// passed by handle - no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<OrderAgent>,
    pub sessions: Arc<SessionStore>,
    pub conversations: Arc<dyn ConversationLog>,
    pub orders: Arc<dyn OrderStore>,
    pub catalog: ProductCatalog,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client construction failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "database migrations applied"
    );

    let llm: Arc<dyn LlmClient> =
        Arc::new(GroqClient::new(&config.llm).map_err(BootstrapError::Llm)?);
    let sessions = Arc::new(SessionStore::new());
    let catalog = ProductCatalog::default();
    let agent = Arc::new(OrderAgent::new(
        llm,
        Arc::clone(&sessions),
        catalog.clone(),
        config.llm.temperature,
        config.llm.max_tokens,
    ));

    let state = AppState {
        agent,
        sessions,
        conversations: Arc::new(metrobot_db::InMemoryConversationLog::default()),
        orders: Arc::new(SqlOrderStore::new(db_pool.clone())),
        catalog,
    };

    Ok(Application { config, db_pool, state })
}

impl Application {
    pub fn router(&self) -> Router {
        Router::new()
            .merge(web::router(self.state.catalog.clone()))
            .merge(health::router(self.db_pool.clone()))
            .merge(chat::router(self.state.clone()))
            .merge(orders::router(self.state.clone()))
    }
}
