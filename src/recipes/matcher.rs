use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{RecipeCatalog, RecipeId, normalize};

/// Finds every recipe that uses all of the user's ingredients.
///
/// Results are shuffled on every call so repeated searches with the same
/// ingredients surface different recipes first.
#[derive(Debug, Clone)]
pub struct RecipeMatcher {
    catalog: Arc<RecipeCatalog>,
}

impl RecipeMatcher {
    pub fn new(catalog: Arc<RecipeCatalog>) -> Self {
        Self { catalog }
    }

    /// Canonical, stoplist-filtered set for a user's ingredient list.
    pub fn canonical_set<S: AsRef<str>>(ingredients: &[S]) -> BTreeSet<String> {
        ingredients
            .iter()
            .filter_map(|ingredient| normalize(ingredient.as_ref()))
            .collect()
    }

    /// Every recipe whose ingredient set is a superset of `ingredients`,
    /// in random order.
    ///
    /// Callers must check for an empty ingredient list first; an empty
    /// result means nothing matched.
    pub fn find_recipes<S: AsRef<str>>(&self, ingredients: &[S]) -> Vec<RecipeId> {
        self.find_recipes_with_rng(ingredients, &mut rand::thread_rng())
    }

    pub fn find_recipes_with_rng<S, R>(&self, ingredients: &[S], rng: &mut R) -> Vec<RecipeId>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let wanted = Self::canonical_set(ingredients);

        let mut found: Vec<RecipeId> = self
            .catalog
            .iter()
            .filter(|(_, recipe)| recipe.ingredient_set.is_superset(&wanted))
            .map(|(id, _)| id)
            .collect();

        found.shuffle(rng);

        tracing::debug!(
            name: "matcher.search",
            ingredients = ?wanted,
            matches = found.len(),
            "Recipe search finished"
        );

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::fixtures;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn matcher() -> RecipeMatcher {
        RecipeMatcher::new(Arc::new(fixtures::catalog()))
    }

    fn sorted(mut ids: Vec<RecipeId>) -> Vec<RecipeId> {
        ids.sort();
        ids
    }

    #[test]
    fn test_superset_matching() {
        let found = matcher().find_recipes(&["egg", "flour"]);
        assert_eq!(sorted(found), vec![RecipeId(0), RecipeId(3)]);
    }

    #[test]
    fn test_user_phrasing_is_normalized() {
        let found = matcher().find_recipes(&["Eggs", "FLOUR", "eggs", "a pinch of salt"]);
        assert_eq!(sorted(found), vec![RecipeId(0), RecipeId(3)]);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(matcher().find_recipes(&["chocolate"]).is_empty());
    }

    #[test]
    fn test_only_stoplisted_ingredients_match_everything() {
        let found = matcher().find_recipes(&["water", "salt"]);
        assert_eq!(found.len(), fixtures::catalog().len());
    }

    #[test]
    fn test_every_match_contains_its_own_query() {
        let catalog = Arc::new(fixtures::catalog());
        let matcher = RecipeMatcher::new(Arc::clone(&catalog));
        for id in matcher.find_recipes(&["egg", "flour"]) {
            let recipe = catalog.get(id).unwrap();
            let own: Vec<&str> = recipe.ingredient_set.iter().map(String::as_str).collect();
            assert!(matcher.find_recipes(&own).contains(&id));
        }
    }

    #[test]
    fn test_order_follows_the_rng() {
        let matcher = matcher();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            matcher.find_recipes_with_rng(&["egg"], &mut a),
            matcher.find_recipes_with_rng(&["egg"], &mut b)
        );
    }
}
