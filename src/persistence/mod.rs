use crate::session::UserRecord;
use anyhow::Result;
use async_trait::async_trait;

pub mod providers;

/// Durable key-value storage of users, keyed by platform user id.
///
/// Each call is a single atomic read or write; implementations do not
/// coordinate concurrent writers.
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>>;
    async fn put_user(&self, user: &UserRecord) -> Result<()>;
}
