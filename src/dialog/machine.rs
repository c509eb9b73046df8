//! The dialog state machine.
//!
//! Every intent maps to one transition function through [`DialogMachine::handler`].
//! A transition takes the current session by value and returns the next
//! session together with what should be said; it never touches storage.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::debug;

use super::intent::{Intent, IntentKind};
use crate::recipes::{Recipe, RecipeCatalog, RecipeId, RecipeMatcher};
use crate::session::{DialogState, Session};

/// Ingredient lines revealed per `prepare` turn.
pub const INGREDIENT_BATCH: usize = 4;

/// Ingredients suggested in the first-time welcome.
pub const WELCOME_EXAMPLES: [&str; 5] = ["tomatoes", "potatoes", "flour", "coconut", "avocado"];

/// What the reply should say, independent of wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// The prompt for the current state.
    Prompt,
    /// First-time welcome suggesting an example ingredient.
    Welcome { example: String },
    /// Resume preamble followed by the prompt.
    WelcomeBack,
    Help,
    Goodbye,
    /// The intent has no meaning in this state; acknowledge and re-prompt.
    Acknowledge,
    Added(String),
    AlreadyListed(String),
    Removed(String),
    NotListed(String),
    /// An ingredient intent arrived without its slot.
    MissingIngredient(IntentKind),
    /// Search with an empty ingredient list.
    NeedIngredients,
    NoMatches { ingredients: Vec<String> },
    Clarified { recipe: RecipeId, line: usize },
    NotInRecipe { ingredient: String },
    NoRecipeSelected,
    FinishedCooking { recipe: RecipeId },
}

/// Result of applying one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub utterance: Utterance,
    /// Attach the focused recipe's card to the reply.
    pub show_card: bool,
    /// The conversation ends after this reply.
    pub end_session: bool,
}

impl Transition {
    fn new(session: Session, utterance: Utterance) -> Self {
        Self {
            session,
            utterance,
            show_card: false,
            end_session: false,
        }
    }

    fn prompt(session: Session) -> Self {
        Self::new(session, Utterance::Prompt)
    }

    fn with_card(mut self) -> Self {
        self.show_card = self.session.recipe.is_some();
        self
    }

    fn ending(mut self) -> Self {
        self.end_session = true;
        self
    }
}

/// A transition function: current session and slot value in, next
/// session and reply data out.
pub type TransitionFn = fn(&DialogMachine, Session, Option<&str>) -> Transition;

/// Applies intents to sessions.
#[derive(Debug, Clone)]
pub struct DialogMachine {
    catalog: Arc<RecipeCatalog>,
    matcher: RecipeMatcher,
}

impl DialogMachine {
    pub fn new(catalog: Arc<RecipeCatalog>) -> Self {
        let matcher = RecipeMatcher::new(Arc::clone(&catalog));
        Self { catalog, matcher }
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// The dispatch table.
    pub fn handler(kind: IntentKind) -> TransitionFn {
        match kind {
            IntentKind::Launch => launch,
            IntentKind::SessionStarted => session_started,
            IntentKind::Help => help,
            IntentKind::Cancel | IntentKind::Stop | IntentKind::SessionEnded => farewell,
            IntentKind::Confirm => confirm,
            IntentKind::Deny => deny,
            IntentKind::Repeat => repeat,
            IntentKind::Previous => previous,
            IntentKind::Next => next,
            IntentKind::Add => add,
            IntentKind::Remove => remove,
            IntentKind::Search => search,
            IntentKind::Clarify => clarify,
            IntentKind::Restart => restart,
        }
    }

    /// Apply `intent` to `session`.
    ///
    /// A pending restart confirmation takes precedence: `Confirm` resets,
    /// `Deny` resumes. Any other dialog intent counts as an implicit deny
    /// and is then handled normally; lifecycle intents and `Repeat` leave
    /// the pending question in place.
    pub fn apply(&self, mut session: Session, intent: &Intent) -> Transition {
        if session.confirm_for_restart {
            match intent.kind {
                IntentKind::Confirm => return Transition::prompt(Session::default()),
                IntentKind::Deny => {
                    session.confirm_for_restart = false;
                    return Transition::prompt(session);
                }
                kind if kind.is_lifecycle() || kind == IntentKind::Repeat => {}
                kind => {
                    debug!(
                        name: "dialog.restart.implicit_deny",
                        intent = %kind,
                        "Restart confirmation abandoned"
                    );
                    session.confirm_for_restart = false;
                }
            }
        }

        let handler = Self::handler(intent.kind);
        handler(self, session, intent.ingredient.as_deref())
    }

    fn focused(&self, session: &Session) -> Option<&Recipe> {
        session.recipe.and_then(|id| self.catalog.get(id))
    }
}

fn launch(_: &DialogMachine, session: Session, _: Option<&str>) -> Transition {
    if session.state == DialogState::Ingredients && !session.confirm_for_restart {
        let example = WELCOME_EXAMPLES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("flour")
            .to_string();
        return Transition::new(session, Utterance::Welcome { example });
    }
    Transition::new(session, Utterance::WelcomeBack).with_card()
}

fn session_started(_: &DialogMachine, session: Session, _: Option<&str>) -> Transition {
    Transition::prompt(session)
}

fn help(_: &DialogMachine, session: Session, _: Option<&str>) -> Transition {
    Transition::new(session, Utterance::Help)
}

fn farewell(_: &DialogMachine, session: Session, _: Option<&str>) -> Transition {
    Transition::new(session, Utterance::Goodbye).ending()
}

fn repeat(_: &DialogMachine, session: Session, _: Option<&str>) -> Transition {
    Transition::prompt(session)
}

fn confirm(machine: &DialogMachine, mut session: Session, _: Option<&str>) -> Transition {
    match session.state {
        DialogState::Ingredients => Transition::prompt(session),
        DialogState::Search => {
            session.state = DialogState::Prepare;
            session.step = 0;
            Transition::prompt(session)
        }
        DialogState::Prepare => {
            let Some(recipe) = machine.focused(&session) else {
                return lost_focus(session);
            };
            if session.step + INGREDIENT_BATCH >= recipe.ingredient_lines.len() {
                enter_cook(machine, session)
            } else {
                session.step += INGREDIENT_BATCH;
                Transition::prompt(session)
            }
        }
        DialogState::Cook => Transition::new(session, Utterance::Acknowledge),
    }
}

fn deny(_: &DialogMachine, mut session: Session, _: Option<&str>) -> Transition {
    match session.state {
        DialogState::Search | DialogState::Prepare => {
            cycle(&mut session, true);
            session.state = DialogState::Search;
            session.step = 0;
            Transition::prompt(session).with_card()
        }
        DialogState::Ingredients => Transition::prompt(session),
        DialogState::Cook => Transition::new(session, Utterance::Acknowledge),
    }
}

fn next(machine: &DialogMachine, mut session: Session, _: Option<&str>) -> Transition {
    match session.state {
        DialogState::Search => {
            cycle(&mut session, true);
            Transition::prompt(session).with_card()
        }
        DialogState::Cook => {
            let Some(recipe) = machine.focused(&session) else {
                return lost_focus(session);
            };
            session.step += 1;
            if session.step >= recipe.steps.len() {
                finish_cooking(session)
            } else {
                Transition::prompt(session)
            }
        }
        DialogState::Ingredients | DialogState::Prepare => {
            Transition::new(session, Utterance::Acknowledge)
        }
    }
}

fn previous(_: &DialogMachine, mut session: Session, _: Option<&str>) -> Transition {
    match session.state {
        DialogState::Search => {
            cycle(&mut session, false);
            Transition::prompt(session).with_card()
        }
        DialogState::Prepare => {
            session.step = session.step.saturating_sub(INGREDIENT_BATCH);
            Transition::prompt(session)
        }
        DialogState::Cook => {
            session.step = session.step.saturating_sub(1);
            Transition::prompt(session)
        }
        DialogState::Ingredients => Transition::new(session, Utterance::Acknowledge),
    }
}

fn add(_: &DialogMachine, mut session: Session, ingredient: Option<&str>) -> Transition {
    let Some(ingredient) = ingredient.map(str::trim).filter(|i| !i.is_empty()) else {
        return Transition::new(session, Utterance::MissingIngredient(IntentKind::Add));
    };

    if session.ingredient_list.iter().any(|i| i == ingredient) {
        return Transition::new(session, Utterance::AlreadyListed(ingredient.to_string()));
    }

    session.ingredient_list.push(ingredient.to_string());
    // Results were computed for the previous ingredient list.
    session.state = DialogState::Ingredients;
    session.recipe_list.clear();
    session.recipe = None;
    session.step = 0;
    Transition::new(session, Utterance::Added(ingredient.to_string()))
}

fn remove(_: &DialogMachine, mut session: Session, ingredient: Option<&str>) -> Transition {
    let Some(ingredient) = ingredient.map(str::trim).filter(|i| !i.is_empty()) else {
        return Transition::new(session, Utterance::MissingIngredient(IntentKind::Remove));
    };

    match session.ingredient_list.iter().position(|i| i == ingredient) {
        Some(index) => {
            session.ingredient_list.remove(index);
            Transition::new(session, Utterance::Removed(ingredient.to_string()))
        }
        None => Transition::new(session, Utterance::NotListed(ingredient.to_string())),
    }
}

fn search(machine: &DialogMachine, mut session: Session, _: Option<&str>) -> Transition {
    if session.ingredient_list.is_empty() {
        return Transition::new(session, Utterance::NeedIngredients);
    }

    let found = machine.matcher.find_recipes(&session.ingredient_list);
    let Some(first) = found.first().copied() else {
        let ingredients = session.ingredient_list.clone();
        return Transition::new(session, Utterance::NoMatches { ingredients });
    };

    session.state = DialogState::Search;
    session.recipe_list = found;
    session.recipe = Some(first);
    session.step = 0;
    Transition::prompt(session).with_card()
}

fn clarify(machine: &DialogMachine, session: Session, ingredient: Option<&str>) -> Transition {
    let Some(ingredient) = ingredient.map(str::trim).filter(|i| !i.is_empty()) else {
        return Transition::new(session, Utterance::MissingIngredient(IntentKind::Clarify));
    };

    let (Some(id), Some(recipe)) = (session.recipe, machine.focused(&session)) else {
        return Transition::new(session, Utterance::NoRecipeSelected);
    };

    let needle = ingredient.to_lowercase();
    let utterance = match recipe
        .ingredient_lines
        .iter()
        .position(|line| line.to_lowercase().contains(&needle))
    {
        Some(line) => Utterance::Clarified { recipe: id, line },
        None => Utterance::NotInRecipe {
            ingredient: ingredient.to_string(),
        },
    };
    Transition::new(session, utterance)
}

fn restart(_: &DialogMachine, mut session: Session, _: Option<&str>) -> Transition {
    session.confirm_for_restart = true;
    Transition::prompt(session)
}

/// Move the focus one entry forward or backward through `recipe_list`,
/// wrapping at both ends.
fn cycle(session: &mut Session, forward: bool) {
    let len = session.recipe_list.len();
    if len == 0 {
        return;
    }
    let current = session.focus_index().unwrap_or(0);
    let target = if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    };
    session.recipe = Some(session.recipe_list[target]);
}

fn enter_cook(machine: &DialogMachine, mut session: Session) -> Transition {
    session.state = DialogState::Cook;
    session.step = 0;
    match machine.focused(&session) {
        Some(recipe) if !recipe.steps.is_empty() => Transition::prompt(session),
        Some(_) => finish_cooking(session),
        None => lost_focus(session),
    }
}

fn finish_cooking(session: Session) -> Transition {
    match session.recipe {
        Some(recipe) => Transition::new(
            Session::default(),
            Utterance::FinishedCooking { recipe },
        )
        .ending(),
        None => Transition::prompt(Session::default()),
    }
}

/// The focused recipe vanished; sessions are validated on load, so this
/// only happens for hand-built sessions. Start over.
fn lost_focus(session: Session) -> Transition {
    tracing::warn!(
        name: "dialog.focus.lost",
        state = %session.state,
        recipe = ?session.recipe,
        "No focused recipe; resetting session"
    );
    Transition::prompt(Session::default())
}
