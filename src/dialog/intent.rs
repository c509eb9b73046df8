//! Already-decoded intents as delivered by the voice transport.

use std::fmt;

use thiserror::Error;

/// Intent names understood by the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Launch,
    SessionStarted,
    Help,
    Cancel,
    Stop,
    SessionEnded,
    Confirm,
    Deny,
    Repeat,
    Previous,
    Next,
    Add,
    Remove,
    Search,
    Clarify,
    Restart,
}

impl IntentKind {
    pub const ALL: [IntentKind; 16] = [
        Self::Launch,
        Self::SessionStarted,
        Self::Help,
        Self::Cancel,
        Self::Stop,
        Self::SessionEnded,
        Self::Confirm,
        Self::Deny,
        Self::Repeat,
        Self::Previous,
        Self::Next,
        Self::Add,
        Self::Remove,
        Self::Search,
        Self::Clarify,
        Self::Restart,
    ];

    /// Resolve a short name (`Confirm`) or a platform name (`YesIntent`,
    /// `AMAZON.StopIntent`, `LaunchRequest`).
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim() {
            "Launch" | "LaunchRequest" => Self::Launch,
            "SessionStarted" | "SessionStartedRequest" => Self::SessionStarted,
            "Help" | "AMAZON.HelpIntent" => Self::Help,
            "Cancel" | "AMAZON.CancelIntent" => Self::Cancel,
            "Stop" | "AMAZON.StopIntent" => Self::Stop,
            "SessionEnded" | "SessionEndedRequest" => Self::SessionEnded,
            "Confirm" | "Yes" | "YesIntent" | "AMAZON.YesIntent" => Self::Confirm,
            "Deny" | "No" | "NoIntent" | "AMAZON.NoIntent" => Self::Deny,
            "Repeat" | "RepeatIntent" | "AMAZON.RepeatIntent" => Self::Repeat,
            "Previous" | "PreviousIntent" | "AMAZON.PreviousIntent" => Self::Previous,
            "Next" | "NextIntent" | "AMAZON.NextIntent" => Self::Next,
            "Add" | "AddIntent" => Self::Add,
            "Remove" | "RemoveIntent" => Self::Remove,
            "Search" | "SearchIntent" => Self::Search,
            "Clarify" | "ClarificationIntent" => Self::Clarify,
            "Restart" | "RestartIntent" => Self::Restart,
            _ => return None,
        };
        Some(kind)
    }

    /// Lifecycle intents never change dialog state.
    pub fn is_lifecycle(self) -> bool {
        matches!(
            self,
            Self::Launch
                | Self::SessionStarted
                | Self::Help
                | Self::Cancel
                | Self::Stop
                | Self::SessionEnded
        )
    }

    /// Intents that carry an ingredient slot.
    pub fn takes_ingredient(self) -> bool {
        matches!(self, Self::Add | Self::Remove | Self::Clarify)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("unknown intent '{0}'")]
    Unknown(String),
}

/// A decoded intent with its optional ingredient slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub kind: IntentKind,
    /// Trimmed slot value; blank values are treated as missing.
    pub ingredient: Option<String>,
}

impl Intent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            ingredient: None,
        }
    }

    pub fn with_ingredient(kind: IntentKind, ingredient: impl Into<String>) -> Self {
        let ingredient = ingredient.into().trim().to_string();
        Self {
            kind,
            ingredient: (!ingredient.is_empty()).then_some(ingredient),
        }
    }

    /// Decode an intent name and slot value from the transport.
    ///
    /// The slot is ignored for intents that do not take one.
    pub fn parse(name: &str, ingredient: Option<&str>) -> Result<Self, IntentError> {
        let kind = IntentKind::from_name(name).ok_or_else(|| IntentError::Unknown(name.into()))?;
        match ingredient {
            Some(value) if kind.takes_ingredient() => Ok(Self::with_ingredient(kind, value)),
            _ => Ok(Self::new(kind)),
        }
    }
}
