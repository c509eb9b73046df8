//! Per-user dialog sessions.
//!
//! A session is the complete dialog state carried from one turn to the
//! next. It is stored inside the user's record and validated on every load:
//! a session that is missing fields, or that no longer fits the catalog, is
//! treated as absent and replaced by the default session.
//!
//! # Architecture
//!
//! - [`Session`]: typed dialog state (state, ingredients, results, cursor)
//! - [`UserRecord`]: persisted user with timestamps and the raw session
//! - [`SessionStore`]: load/save adapter over a
//!   [`UserRepository`](crate::persistence::UserRepository)
//!
//! # Example
//!
//! ```rust
//! use food_world::session::{DialogState, Session};
//!
//! let session = Session::default();
//! assert_eq!(session.state, DialogState::Ingredients);
//! assert_eq!(session.recipe, None);
//! ```

mod model;
mod store;

pub use model::{DialogState, Session, UserRecord};
pub use store::{LoadedSession, SessionOrigin, SessionStore};
