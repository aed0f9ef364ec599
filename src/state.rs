use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db;
use crate::render::{JsonRenderer, Renderer};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        Ok(Self {
            db,
            config,
            renderer: Arc::new(JsonRenderer),
        })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            db,
            config,
            renderer,
        }
    }

    #[cfg(test)]
    pub async fn for_tests() -> Self {
        use crate::config::SessionConfig;

        let db = db::test_pool().await;
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            session: SessionConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                ttl_minutes: 5,
            },
        });
        Self::from_parts(db, config, Arc::new(JsonRenderer))
    }
}
