//! Typed dialog session and the persisted user record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recipes::{RecipeCatalog, RecipeId};

/// The four dialog states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogState {
    /// Collecting ingredients.
    #[default]
    Ingredients,
    /// Offering search results one recipe at a time.
    Search,
    /// Checking the focused recipe's ingredients in batches.
    Prepare,
    /// Walking through cooking steps.
    Cook,
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ingredients => "ingredients",
            Self::Search => "search",
            Self::Prepare => "prepare",
            Self::Cook => "cook",
        };
        f.write_str(name)
    }
}

/// Per-user dialog state carried between turns.
///
/// All six fields are required when deserializing; a stored session that is
/// missing any of them fails to parse and is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub state: DialogState,
    /// User-entered ingredients in insertion order.
    pub ingredient_list: Vec<String>,
    /// Search results for the current ingredient list.
    pub recipe_list: Vec<RecipeId>,
    /// Focused recipe, persisted as `-1` when none.
    #[serde(with = "recipe_sentinel")]
    pub recipe: Option<RecipeId>,
    /// Ingredient-reveal offset in `prepare`, step index in `cook`.
    pub step: usize,
    pub confirm_for_restart: bool,
}

impl Session {
    /// Position of the focused recipe within `recipe_list`.
    pub fn focus_index(&self) -> Option<usize> {
        let recipe = self.recipe?;
        self.recipe_list.iter().position(|id| *id == recipe)
    }

    /// Check the cross-field invariants against the catalog.
    ///
    /// `search`, `prepare` and `cook` need a focused recipe that belongs to
    /// the result list, and the step cursor must point inside the recipe.
    pub fn is_consistent(&self, catalog: &RecipeCatalog) -> bool {
        if !self.recipe_list.iter().all(|id| catalog.contains(*id)) {
            return false;
        }
        if let Some(recipe) = self.recipe {
            if !catalog.contains(recipe) {
                return false;
            }
        }

        match self.state {
            DialogState::Ingredients => true,
            DialogState::Search => self.focus_index().is_some(),
            DialogState::Prepare => {
                self.focus_index().is_some()
                    && self
                        .recipe
                        .and_then(|id| catalog.get(id))
                        .is_some_and(|r| self.step <= r.ingredient_lines.len())
            }
            DialogState::Cook => self
                .recipe
                .and_then(|id| catalog.get(id))
                .is_some_and(|r| self.step < r.steps.len()),
        }
    }
}

/// `Option<RecipeId>` stored as a plain integer with `-1` for none.
mod recipe_sentinel {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::recipes::RecipeId;

    pub fn serialize<S>(value: &Option<RecipeId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_u64(id.0 as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RecipeId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            -1 => Ok(None),
            n if n >= 0 => usize::try_from(n)
                .map(|n| Some(RecipeId(n)))
                .map_err(D::Error::custom),
            n => Err(D::Error::custom(format!("invalid recipe index {n}"))),
        }
    }
}

/// A stored user: identity, activity timestamps and the raw session fields.
///
/// The session is kept as a raw JSON map so that a partially written or
/// outdated blob still loads as a user; [`UserRecord::session`] decides
/// whether it is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    #[serde(flatten)]
    pub state: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// A first-contact user with the default session.
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            user_id: user_id.into(),
            joined_at: now,
            last_seen_at: now,
            state: serde_json::Map::new(),
        };
        record.set_session(&Session::default());
        record
    }

    /// Decode the stored session; `None` if any field is missing or invalid.
    pub fn session(&self) -> Option<Session> {
        serde_json::from_value(serde_json::Value::Object(self.state.clone())).ok()
    }

    pub fn set_session(&mut self, session: &Session) {
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(session) {
            self.state = map;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::fixtures;
    use serde_json::json;

    fn searching() -> Session {
        Session {
            state: DialogState::Search,
            ingredient_list: vec!["egg".to_string()],
            recipe_list: vec![RecipeId(1), RecipeId(0)],
            recipe: Some(RecipeId(0)),
            step: 0,
            confirm_for_restart: false,
        }
    }

    #[test]
    fn test_default_session() {
        let session = Session::default();
        assert_eq!(session.state, DialogState::Ingredients);
        assert!(session.ingredient_list.is_empty());
        assert!(session.recipe_list.is_empty());
        assert_eq!(session.recipe, None);
        assert_eq!(session.step, 0);
        assert!(!session.confirm_for_restart);
    }

    #[test]
    fn test_persisted_layout() {
        let value = serde_json::to_value(Session::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "state": "ingredients",
                "ingredientList": [],
                "recipeList": [],
                "recipe": -1,
                "step": 0,
                "confirmForRestart": false
            })
        );

        let value = serde_json::to_value(searching()).unwrap();
        assert_eq!(value["recipe"], json!(0));
        assert_eq!(value["recipeList"], json!([1, 0]));
    }

    #[test]
    fn test_user_record_roundtrip_keeps_session() {
        let now = Utc::now();
        let mut user = UserRecord::new("amzn1.user", now);
        user.set_session(&searching());

        let encoded = serde_json::to_string(&user).unwrap();
        let decoded: UserRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.session(), Some(searching()));
        assert_eq!(decoded.user_id, "amzn1.user");
    }

    #[test]
    fn test_any_missing_field_makes_session_absent() {
        let full = serde_json::to_value(searching()).unwrap();
        let serde_json::Value::Object(full) = full else {
            panic!("session must serialize to an object");
        };

        for key in full.keys() {
            let mut partial = full.clone();
            partial.remove(key);
            let user = UserRecord {
                user_id: "u".to_string(),
                joined_at: Utc::now(),
                last_seen_at: Utc::now(),
                state: partial,
            };
            assert_eq!(user.session(), None, "missing {key}");
        }
    }

    #[test]
    fn test_negative_recipe_other_than_sentinel_is_rejected() {
        let mut value = serde_json::to_value(Session::default()).unwrap();
        value["recipe"] = json!(-4);
        assert!(serde_json::from_value::<Session>(value).is_err());
    }

    #[test]
    fn test_consistency_rules() {
        let catalog = fixtures::catalog();
        assert!(Session::default().is_consistent(&catalog));
        assert!(searching().is_consistent(&catalog));

        let mut orphan = searching();
        orphan.recipe = Some(RecipeId(2));
        assert!(!orphan.is_consistent(&catalog));

        let mut unknown = searching();
        unknown.recipe_list.push(RecipeId(99));
        assert!(!unknown.is_consistent(&catalog));

        let mut cooking = searching();
        cooking.state = DialogState::Cook;
        cooking.step = 2;
        assert!(cooking.is_consistent(&catalog));
        cooking.step = 3;
        assert!(!cooking.is_consistent(&catalog));

        let mut preparing = searching();
        preparing.state = DialogState::Prepare;
        preparing.step = 4;
        assert!(preparing.is_consistent(&catalog));
        preparing.step = 9;
        assert!(!preparing.is_consistent(&catalog));
    }
}
