use crate::config::DatabaseConfig;
use anyhow::Context;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

/// Primary database that keeps connection credentials, extensions are implemented separately in
/// every module.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: PgPool,
}

impl Database {
    /// Connects to the database described by the config and applies pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .database(&config.name);
        if let Some(ref password) = config.password {
            options = options.password(password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to the database ({}:{}/{}).",
                    config.host, config.port, config.name
                )
            })?;

        Self::create(pool).await
    }

    /// Wraps an existing connection pool and applies pending migrations.
    pub async fn create(pool: PgPool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .with_context(|| "Failed to migrate database")?;

        Ok(Database { pool })
    }
}
