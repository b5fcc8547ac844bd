//! Target model selection.
//!
//! Pure functions only; no I/O.

use std::fmt;

use crate::domain::error::ConfigError;

/// The Juju model a run operates on: `[<controller>:]<model>`.
///
/// `None` for both parts means "the current model of the current controller".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelTarget {
    controller: Option<String>,
    model: Option<String>,
}

/// Which model a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The target model.
    Model,
    /// The controller model of the target's controller.
    Controller,
}

impl ModelTarget {
    /// Parse a `[<controller>:]<model>` selector.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidModel` for empty parts or more than one `:`.
    pub fn parse(selector: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidModel(selector.to_string());
        let valid_part = |s: &str| !s.is_empty() && !s.chars().any(char::is_whitespace);

        match selector.split_once(':') {
            None if valid_part(selector) => Ok(Self {
                controller: None,
                model: Some(selector.to_string()),
            }),
            Some((controller, model))
                if valid_part(controller) && valid_part(model) && !model.contains(':') =>
            {
                Ok(Self {
                    controller: Some(controller.to_string()),
                    model: Some(model.to_string()),
                })
            }
            _ => Err(invalid()),
        }
    }

    /// The `-m` argument for the given scope, or `None` to use the client default.
    #[must_use]
    pub fn model_arg(&self, scope: Scope) -> Option<String> {
        match scope {
            Scope::Model => match (&self.controller, &self.model) {
                (Some(c), Some(m)) => Some(format!("{c}:{m}")),
                (None, Some(m)) => Some(m.clone()),
                _ => None,
            },
            Scope::Controller => Some(match &self.controller {
                Some(c) => format!("{c}:controller"),
                None => "controller".to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.model_arg(Scope::Model) {
            Some(m) => f.write_str(&m),
            None => f.write_str("(current model)"),
        }
    }
}
