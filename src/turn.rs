//! One request/response cycle for a user.
//!
//! A turn loads (or initializes) the user's session, applies the intent,
//! renders the reply and writes the new session back. Exactly one
//! repository read and one write happen per turn; if the caller drops the
//! future before the write (e.g. on a request timeout) nothing is saved.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dialog::{Composer, DialogMachine, Intent, Reply};
use crate::recipes::RecipeCatalog;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct TurnService {
    store: SessionStore,
    machine: DialogMachine,
    composer: Composer,
}

impl TurnService {
    pub fn new(store: SessionStore, catalog: Arc<RecipeCatalog>) -> Self {
        Self {
            store,
            machine: DialogMachine::new(Arc::clone(&catalog)),
            composer: Composer::new(catalog),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run one turn for `user_id`.
    pub async fn handle(&self, user_id: &str, intent: &Intent) -> Result<Reply> {
        let turn_id = Uuid::new_v4();
        let started = Instant::now();

        let loaded = self.store.begin(user_id).await?;
        let before = loaded.session.state;

        debug!(
            name: "turn.started",
            turn_id = %turn_id,
            user_id = %user_id,
            intent = %intent.kind,
            state = %before,
            origin = ?loaded.origin,
            "Turn started"
        );

        let transition = self.machine.apply(loaded.session.clone(), intent);
        let reply = self.composer.compose(&transition);

        self.store.commit(loaded, &transition.session).await?;

        info!(
            name: "turn.completed",
            turn_id = %turn_id,
            user_id = %user_id,
            intent = %intent.kind,
            from = %before,
            to = %transition.session.state,
            card = reply.card.is_some(),
            continue_session = reply.continue_session,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Turn completed"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::IntentKind;
    use crate::persistence::providers::memory::MemoryProvider;
    use crate::recipes::fixtures;
    use crate::session::{DialogState, Session};

    fn service() -> TurnService {
        let catalog = Arc::new(fixtures::catalog());
        let store = SessionStore::new(Arc::new(MemoryProvider::new()), Arc::clone(&catalog));
        TurnService::new(store, catalog)
    }

    #[tokio::test]
    async fn test_first_turn_persists_default_session() {
        let service = service();
        let reply = service
            .handle("user-1", &Intent::new(IntentKind::Launch))
            .await
            .unwrap();
        assert!(reply.speech.starts_with("Welcome to food world!"));
        assert!(reply.continue_session);
        assert_eq!(
            service.store().load("user-1").await.unwrap(),
            Some(Session::default())
        );
    }

    #[tokio::test]
    async fn test_state_carries_between_turns() {
        let service = service();
        service
            .handle("user-1", &Intent::with_ingredient(IntentKind::Add, "eggs"))
            .await
            .unwrap();
        service
            .handle("user-1", &Intent::with_ingredient(IntentKind::Add, "flour"))
            .await
            .unwrap();
        let reply = service
            .handle("user-1", &Intent::new(IntentKind::Search))
            .await
            .unwrap();
        assert!(reply.speech.starts_with("Found 2 recipes."));
        assert!(reply.card.is_some());

        let session = service.store().load("user-1").await.unwrap().unwrap();
        assert_eq!(session.state, DialogState::Search);
        assert_eq!(session.ingredient_list, vec!["eggs", "flour"]);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let service = service();
        service
            .handle("user-1", &Intent::with_ingredient(IntentKind::Add, "eggs"))
            .await
            .unwrap();
        service
            .handle("user-2", &Intent::new(IntentKind::Help))
            .await
            .unwrap();
        let other = service.store().load("user-2").await.unwrap().unwrap();
        assert!(other.ingredient_list.is_empty());
    }
}
