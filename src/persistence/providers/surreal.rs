use crate::persistence::UserRepository;
use crate::session::UserRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};

const USERS: &str = "users";

#[derive(Debug)]
pub struct SurrealDbProvider {
    db: Surreal<Any>,
}

impl SurrealDbProvider {
    /// Connect to `connection_string` (`mem://`, `surrealkv://path`, `ws://host`).
    pub async fn new(connection_string: &str) -> Result<Self> {
        let db = connect(connection_string).await?;

        db.use_ns("food_world").use_db("food_world").await?;

        Ok(Self { db })
    }
}

// The user record is stored as an opaque JSON document so that a partially
// written session survives the round trip and is judged by the session
// store, not rejected by the database layer.
#[derive(Serialize, Deserialize)]
struct UserDocument {
    user_id: String,
    payload: String,
}

#[async_trait]
impl UserRepository for SurrealDbProvider {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let doc: Option<UserDocument> = self.db.select((USERS, user_id)).await?;
        match doc {
            Some(doc) => Ok(Some(serde_json::from_str(&doc.payload)?)),
            None => Ok(None),
        }
    }

    async fn put_user(&self, user: &UserRecord) -> Result<()> {
        let doc = UserDocument {
            user_id: user.user_id.clone(),
            payload: serde_json::to_string(user)?,
        };
        let _: Option<UserDocument> = self
            .db
            .upsert((USERS, user.user_id.as_str()))
            .content(doc)
            .await?;
        Ok(())
    }
}
