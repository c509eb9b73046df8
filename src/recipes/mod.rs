//! Recipe catalog, ingredient normalization and recipe matching.
//!
//! The catalog is loaded once at startup from a JSON or YAML corpus file and
//! is read-only afterwards. It is shared between turns behind an `Arc`.
//!
//! # Architecture
//!
//! - [`RecipeCatalog`]: indexed, immutable collection of [`Recipe`]s
//! - [`normalize`]: canonical ingredient forms
//! - [`RecipeMatcher`]: superset matching over canonical ingredient sets

mod matcher;
mod normalize;

pub use matcher::RecipeMatcher;
pub use normalize::{STOPLIST, normalize, singularize};

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable index of a recipe in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub usize);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recipe as stored in the corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub title: String,
    pub ingredient_lines_verbose: Vec<String>,
    pub ingredient_set_canonical: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub submitter: Option<String>,
}

/// An immutable recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub title: String,
    /// Verbose ingredient lines for display ("2 cups of flour").
    pub ingredient_lines: Vec<String>,
    /// Canonical ingredient forms used for matching.
    pub ingredient_set: BTreeSet<String>,
    pub steps: Vec<String>,
    /// Categories in corpus order, without duplicates.
    pub categories: Vec<String>,
    pub country: Option<String>,
    pub submitter: Option<String>,
}

impl Recipe {
    /// The category mentioned when the recipe is offered.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

impl From<RecipeRecord> for Recipe {
    fn from(record: RecipeRecord) -> Self {
        // Re-run the canonical form so corpus and queries share one algorithm.
        let ingredient_set = record
            .ingredient_set_canonical
            .iter()
            .filter_map(|ingredient| normalize(ingredient))
            .collect();

        let mut categories: Vec<String> = Vec::with_capacity(record.categories.len());
        for category in record.categories {
            let category = category.trim().to_string();
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }

        Self {
            title: record.title,
            ingredient_lines: record.ingredient_lines_verbose,
            ingredient_set,
            steps: record.steps,
            categories,
            country: record.country.filter(|c| !c.trim().is_empty()),
            submitter: record.submitter.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Errors raised while loading the recipe corpus.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported catalog format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Read-only, indexed recipe collection.
#[derive(Debug, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Build a catalog from recipes in index order.
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Build a catalog from raw corpus records.
    pub fn from_records(records: Vec<RecipeRecord>) -> Self {
        Self::new(records.into_iter().map(Recipe::from).collect())
    }

    /// Parse a JSON corpus.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<RecipeRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Parse a YAML corpus.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let records: Vec<RecipeRecord> = serde_yaml::from_str(yaml)?;
        Ok(Self::from_records(records))
    }

    /// Load a corpus file, picking the format from its extension.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let read = || {
            std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        let catalog = match extension.as_str() {
            "json" => Self::from_json_str(&read()?)?,
            "yaml" | "yml" => Self::from_yaml_str(&read()?)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };

        tracing::info!(
            name: "catalog.loaded",
            path = %path.display(),
            recipes = catalog.len(),
            "Recipe catalog loaded"
        );

        Ok(catalog)
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.0)
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        id.0 < self.recipes.len()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Iterate recipes with their ids, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes
            .iter()
            .enumerate()
            .map(|(index, recipe)| (RecipeId(index), recipe))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(title: &str, lines: &[&str], set: &[&str], steps: &[&str]) -> RecipeRecord {
        RecipeRecord {
            title: title.to_string(),
            ingredient_lines_verbose: lines.iter().map(ToString::to_string).collect(),
            ingredient_set_canonical: set.iter().map(ToString::to_string).collect(),
            steps: steps.iter().map(ToString::to_string).collect(),
            categories: Vec::new(),
            country: None,
            submitter: None,
        }
    }

    /// A small corpus used across unit tests.
    pub fn catalog() -> RecipeCatalog {
        let mut pancakes = record(
            "pancakes",
            &[
                "2 eggs",
                "1 cup flour",
                "1 cup milk",
                "1 tbsp sugar",
                "1 pinch of salt",
            ],
            &["egg", "flour", "milk", "sugar", "salt"],
            &["whisk everything", "fry in a pan", "serve warm"],
        );
        pancakes.categories = vec!["Breakfast".to_string()];
        pancakes.submitter = Some("chefanna".to_string());

        RecipeCatalog::from_records(vec![
            pancakes,
            record(
                "omelette",
                &["3 eggs", "1 onion", "50 g cheese"],
                &["eggs", "onion", "cheese"],
                &["beat the eggs", "cook with onion", "fold with cheese"],
            ),
            record(
                "bread",
                &["500 g flour", "1 packet of yeast", "300 ml water"],
                &["flour", "yeast", "water"],
                &["knead", "let rise", "bake"],
            ),
            record(
                "crepes",
                &["2 eggs", "1 cup flour", "2 cups milk", "1 tbsp butter"],
                &["egg", "flour", "milk", "butter"],
                &["mix", "rest the batter", "cook thin"],
            ),
        ])
    }
}
