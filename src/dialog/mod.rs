//! Conversation logic: intents, the state machine and reply rendering.
//!
//! # Architecture
//!
//! - [`Intent`]: a decoded user request with its optional ingredient slot
//! - [`DialogMachine`]: applies an intent to a [`Session`](crate::session::Session)
//!   and yields a [`Transition`]
//! - [`Composer`]: renders a transition into a [`Reply`]
//!
//! The machine and composer are synchronous and never touch storage; the
//! [`TurnService`](crate::turn::TurnService) wires them to the session store.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use food_world::dialog::{Composer, DialogMachine, Intent, IntentKind};
//! use food_world::recipes::RecipeCatalog;
//! use food_world::session::Session;
//!
//! let catalog = Arc::new(RecipeCatalog::default());
//! let machine = DialogMachine::new(catalog.clone());
//! let composer = Composer::new(catalog);
//!
//! let transition = machine.apply(Session::default(), &Intent::with_ingredient(IntentKind::Add, "eggs"));
//! let reply = composer.compose(&transition);
//! assert_eq!(reply.speech, "Added eggs. Add more ingredients or search for recipes.");
//! ```

mod compose;
mod intent;
mod machine;

pub use compose::{Card, Composer, Reply, join_list};
pub use intent::{Intent, IntentError, IntentKind};
pub use machine::{
    DialogMachine, INGREDIENT_BATCH, Transition, TransitionFn, Utterance, WELCOME_EXAMPLES,
};
