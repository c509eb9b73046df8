use crate::persistence::UserRepository;
use crate::session::UserRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

#[derive(Debug)]
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        // Creates the `users` table with its JSONB session column.
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PostgresProvider {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT user_id, joined_at, last_seen_at, state FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let state = match row.try_get::<serde_json::Value, _>("state")? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Ok(Some(UserRecord {
            user_id: row.try_get("user_id")?,
            joined_at: row.try_get::<DateTime<Utc>, _>("joined_at")?,
            last_seen_at: row.try_get::<DateTime<Utc>, _>("last_seen_at")?,
            state,
        }))
    }

    async fn put_user(&self, user: &UserRecord) -> Result<()> {
        let state = serde_json::Value::Object(user.state.clone());

        sqlx::query(
            r#"
            INSERT INTO users (user_id, joined_at, last_seen_at, state)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                last_seen_at = EXCLUDED.last_seen_at,
                state = EXCLUDED.state
            "#,
        )
        .bind(&user.user_id)
        .bind(user.joined_at)
        .bind(user.last_seen_at)
        .bind(state)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
