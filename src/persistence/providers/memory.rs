use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::persistence::UserRepository;
use crate::session::UserRecord;

/// Process-local user storage. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryProvider {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let guard = self
            .users
            .read()
            .map_err(|e| anyhow!("user store lock poisoned: {e}"))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn put_user(&self, user: &UserRecord) -> Result<()> {
        let mut guard = self
            .users
            .write()
            .map_err(|e| anyhow!("user store lock poisoned: {e}"))?;
        guard.insert(user.user_id.clone(), user.clone());
        Ok(())
    }
}
