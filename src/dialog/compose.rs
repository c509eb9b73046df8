//! Renders transitions into spoken replies and recipe cards.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::intent::IntentKind;
use super::machine::{INGREDIENT_BATCH, Transition, Utterance};
use crate::recipes::{Recipe, RecipeCatalog, RecipeId};
use crate::session::{DialogState, Session};

const INGREDIENTS_PROMPT: &str = "Add more ingredients or search for recipes.";
const RESTART_QUESTION: &str =
    "Restarting ends the current recipe and resets the ingredients. Are you sure?";
const HELP: &str = "Food world lets you discover recipes from all over the world! \
    You can add ingredients using for example: alexa, add eggs. \
    You can also search for recipes using: alexa, search recipes.";
const GOODBYE: &str = "Thanks for using food world!";
const NEED_INGREDIENTS: &str =
    "I need at least one ingredient. Add ingredients using for example: alexa, add marshmallows.";
const NO_RECIPE_SELECTED: &str =
    "There is no recipe selected yet. Search for recipes using: alexa, search recipes.";
const CARD_SOURCE: &str = "recipes.wikia.com";

const FALLBACK_TITLE: &str = "this recipe";
const FALLBACK_LINE: &str = "an ingredient";
const FALLBACK_STEP: &str = "this step";

/// Visual card shown next to the spoken reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub content: String,
}

/// Everything the transport sends back for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub speech: String,
    pub continue_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
}

/// Turns dialog output into text. Pure apart from fallback logging.
#[derive(Debug, Clone)]
pub struct Composer {
    catalog: Arc<RecipeCatalog>,
}

impl Composer {
    pub fn new(catalog: Arc<RecipeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn compose(&self, transition: &Transition) -> Reply {
        let session = &transition.session;
        let speech = self.speech(&transition.utterance, session);

        let card = if transition.show_card {
            session.recipe.and_then(|id| self.recipe_card(id))
        } else {
            None
        };

        Reply {
            speech,
            continue_session: !transition.end_session,
            card,
        }
    }

    fn speech(&self, utterance: &Utterance, session: &Session) -> String {
        match utterance {
            Utterance::Prompt => self.state_prompt(session),
            Utterance::Welcome { example } => format!(
                "Welcome to food world! Discover exciting new recipes! \
                 First add some ingredients you want to use. For example: alexa, add {example}."
            ),
            Utterance::WelcomeBack => format!(
                "Welcome back to food world! Let's continue where we left off. \
                 You can restart any time using: alexa, restart. {}",
                self.state_prompt(session)
            ),
            Utterance::Help => HELP.to_string(),
            Utterance::Goodbye => GOODBYE.to_string(),
            Utterance::Acknowledge => format!("Ok with me. {}", self.state_prompt(session)),
            Utterance::Added(ingredient) => {
                format!("Added {ingredient}. {}", self.state_prompt(session))
            }
            Utterance::AlreadyListed(ingredient) => format!(
                "{ingredient} is already on the ingredient list. {}",
                self.state_prompt(session)
            ),
            Utterance::Removed(ingredient) => format!(
                "Removed {ingredient} from the ingredient list. {}",
                self.state_prompt(session)
            ),
            Utterance::NotListed(ingredient) => format!(
                "{ingredient} is not on the ingredient list. {}",
                self.state_prompt(session)
            ),
            Utterance::MissingIngredient(kind) => missing_ingredient(*kind),
            Utterance::NeedIngredients => NEED_INGREDIENTS.to_string(),
            Utterance::NoMatches { ingredients } => format!(
                "Could not find a recipe. Try removing an ingredient, your current list is: {}.",
                join_list(ingredients)
            ),
            Utterance::Clarified { recipe, line } => {
                let text = self
                    .catalog
                    .get(*recipe)
                    .and_then(|r| r.ingredient_lines.get(*line))
                    .map_or(FALLBACK_LINE, |l| speakable(l, FALLBACK_LINE, *recipe));
                format!(
                    "You need {}. Repeat the last step using: alexa, repeat.",
                    strip_period(text)
                )
            }
            Utterance::NotInRecipe { ingredient } => {
                format!("Could not find any {ingredient} in this recipe.")
            }
            Utterance::NoRecipeSelected => NO_RECIPE_SELECTED.to_string(),
            Utterance::FinishedCooking { recipe } => format!(
                "You're done preparing {}! Thanks for using food world and enjoy your meal!",
                self.title(*recipe)
            ),
        }
    }

    /// The prompt for the session's current state.
    ///
    /// `Repeat` replays exactly this text, so it depends on nothing but the
    /// session and the catalog.
    pub fn state_prompt(&self, session: &Session) -> String {
        if session.confirm_for_restart {
            return RESTART_QUESTION.to_string();
        }

        let focused = session
            .recipe
            .and_then(|id| self.catalog.get(id).map(|recipe| (id, recipe)));

        match (session.state, focused) {
            (DialogState::Ingredients, _) | (_, None) => INGREDIENTS_PROMPT.to_string(),
            (DialogState::Search, Some((id, recipe))) => search_offer(session, id, recipe),
            (DialogState::Prepare, Some((id, recipe))) => ingredient_batch(session.step, id, recipe),
            (DialogState::Cook, Some((id, recipe))) => cooking_step(session.step, id, recipe),
        }
    }

    /// Card with the full recipe, or `None` for an unknown id.
    pub fn recipe_card(&self, id: RecipeId) -> Option<Card> {
        let recipe = self.catalog.get(id)?;

        let mut content = String::from("INGREDIENTS\n");
        for line in &recipe.ingredient_lines {
            content.push_str(&sentence(speakable(line, FALLBACK_LINE, id)));
            content.push('\n');
        }
        content.push_str("DIRECTIONS\n");
        for step in &recipe.steps {
            content.push_str(&sentence(speakable(step, FALLBACK_STEP, id)));
            content.push('\n');
        }
        match recipe.submitter.as_deref() {
            Some(submitter) if !is_corrupt(submitter) => {
                content.push_str(&format!("Submitted by {submitter} on {CARD_SOURCE}."));
            }
            _ => content.push_str(&format!("Recipe from {CARD_SOURCE}.")),
        }

        Some(Card {
            title: title_case(speakable(&recipe.title, FALLBACK_TITLE, id)),
            content,
        })
    }

    fn title(&self, id: RecipeId) -> &str {
        self.catalog
            .get(id)
            .map_or(FALLBACK_TITLE, |r| speakable(&r.title, FALLBACK_TITLE, id))
    }
}

fn search_offer(session: &Session, id: RecipeId, recipe: &Recipe) -> String {
    let mut answer = String::new();
    if session.focus_index() == Some(0) {
        let count = session.recipe_list.len();
        let noun = if count == 1 { "recipe" } else { "recipes" };
        answer.push_str(&format!("Found {count} {noun}. "));
    }
    answer.push_str(&format!(
        "Do you want to cook {}?",
        speakable(&recipe.title, FALLBACK_TITLE, id)
    ));
    if let Some(category) = recipe.primary_category().filter(|c| !is_corrupt(c)) {
        answer.push_str(&format!(" It's a {category}."));
    }
    answer
}

fn ingredient_batch(step: usize, id: RecipeId, recipe: &Recipe) -> String {
    let lines = &recipe.ingredient_lines;
    let batch: Vec<&str> = lines
        .iter()
        .skip(step)
        .take(INGREDIENT_BATCH)
        .map(|line| strip_period(speakable(line, FALLBACK_LINE, id)))
        .collect();

    if batch.is_empty() {
        return "Are you ready to cook?".to_string();
    }

    let intro = if step == 0 {
        let noun = if lines.len() == 1 { "ingredient" } else { "ingredients" };
        format!("This recipe requires the following {} {noun}: ", lines.len())
    } else {
        "Next you'll need ".to_string()
    };
    format!("{intro}{}. Do you have these ingredients?", join_list(&batch))
}

fn cooking_step(step: usize, id: RecipeId, recipe: &Recipe) -> String {
    let text = recipe
        .steps
        .get(step)
        .map_or(FALLBACK_STEP, |s| speakable(s, FALLBACK_STEP, id));
    let preamble = if step == 0 { "Let's get started! " } else { "" };
    format!(
        "{preamble}Step {}: {}. When you're done use: alexa, next.",
        step + 1,
        strip_period(text)
    )
}

fn missing_ingredient(kind: IntentKind) -> String {
    let example = match kind {
        IntentKind::Remove => "alexa, remove coconut.",
        IntentKind::Clarify => "alexa, how much bread did i need?",
        _ => "alexa, add parsley.",
    };
    format!("Please specify an ingredient, for example: {example}")
}

/// Join items as `a`, `a and b`, `a, b and c`.
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Text decoded with replacement characters or carrying control
/// characters cannot be spoken.
fn is_corrupt(text: &str) -> bool {
    text.chars()
        .any(|c| c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()))
}

fn speakable<'a>(text: &'a str, fallback: &'a str, recipe: RecipeId) -> &'a str {
    if is_corrupt(text) {
        warn!(
            name: "compose.fallback",
            recipe = %recipe,
            fallback = fallback,
            "Unspeakable recipe text replaced"
        );
        fallback
    } else {
        text.trim()
    }
}

fn strip_period(text: &str) -> &str {
    text.trim_end().trim_end_matches('.')
}

fn sentence(text: &str) -> String {
    let mut chars = text.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => return String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
