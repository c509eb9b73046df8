//! Session store adapter over a [`UserRepository`].

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

use super::model::{Session, UserRecord};
use crate::persistence::UserRepository;
use crate::recipes::RecipeCatalog;

/// How the session for a turn came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// First contact; a user record was created.
    New,
    /// A complete, consistent session was found.
    Resumed,
    /// A stored session was partial or inconsistent and was replaced.
    Reset,
}

/// A session checked out for the duration of one turn.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub user: UserRecord,
    pub session: Session,
    pub origin: SessionOrigin,
}

/// Loads and saves per-user dialog sessions.
///
/// One turn performs exactly one repository read ([`SessionStore::begin`])
/// and one write ([`SessionStore::commit`]). Turns for the same user are
/// expected to be serialized by the transport; concurrent turns race and
/// the last write wins.
#[derive(Debug, Clone)]
pub struct SessionStore {
    repository: Arc<dyn UserRepository>,
    catalog: Arc<RecipeCatalog>,
}

impl SessionStore {
    pub fn new(repository: Arc<dyn UserRepository>, catalog: Arc<RecipeCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Load the stored session, or `None` if the user is unknown or the
    /// stored session is missing fields or inconsistent with the catalog.
    pub async fn load(&self, user_id: &str) -> Result<Option<Session>> {
        let user = self.repository.get_user(user_id).await?;
        Ok(user.and_then(|user| self.valid_session(&user)))
    }

    /// Persist `session` for `user_id`, creating the user if needed.
    pub async fn save(&self, user_id: &str, session: &Session) -> Result<()> {
        let now = Utc::now();
        let mut user = match self.repository.get_user(user_id).await? {
            Some(user) => user,
            None => UserRecord::new(user_id, now),
        };
        user.last_seen_at = now;
        user.set_session(session);
        self.repository.put_user(&user).await
    }

    /// Load or initialize the session for a turn.
    pub async fn begin(&self, user_id: &str) -> Result<LoadedSession> {
        let now = Utc::now();

        let Some(mut user) = self.repository.get_user(user_id).await? else {
            debug!(name: "session.created", user_id = %user_id, "New user");
            return Ok(LoadedSession {
                user: UserRecord::new(user_id, now),
                session: Session::default(),
                origin: SessionOrigin::New,
            });
        };

        user.last_seen_at = now;
        match self.valid_session(&user) {
            Some(session) => Ok(LoadedSession {
                user,
                session,
                origin: SessionOrigin::Resumed,
            }),
            None => {
                warn!(
                    name: "session.reset",
                    user_id = %user_id,
                    "Stored session is incomplete or inconsistent; resetting"
                );
                Ok(LoadedSession {
                    user,
                    session: Session::default(),
                    origin: SessionOrigin::Reset,
                })
            }
        }
    }

    /// Write back the session produced by a turn.
    pub async fn commit(&self, loaded: LoadedSession, session: &Session) -> Result<()> {
        let mut user = loaded.user;
        user.set_session(session);
        self.repository.put_user(&user).await
    }

    fn valid_session(&self, user: &UserRecord) -> Option<Session> {
        user.session()
            .filter(|session| session.is_consistent(&self.catalog))
    }
}
