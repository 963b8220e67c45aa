//! Action name validation and the service/topic names derived from it.
//!
//! An action `N` is served on three services and two topics:
//!
//! | Entity | Name |
//! |--------|------|
//! | send-goal service | `N/_action/send_goal` |
//! | get-result service | `N/_action/get_result` |
//! | cancel-goal service | `N/_action/cancel_goal` |
//! | feedback topic | `N/_action/feedback` |
//! | status topic | `N/_action/status` |
//!
//! Action names follow the ROS 2 topic name rules, without substitutions:
//!
//! - Must not be empty
//! - May contain alphanumeric characters, underscores, or forward slashes
//! - May start with `/` (absolute) or `~/` (private)
//! - Must not start with a numeric character
//! - Must not end with a forward slash
//! - Must not contain repeated forward slashes or repeated underscores
//!
//! ```
//! use oxidros_action_core::names::validate_action_name;
//!
//! assert!(validate_action_name("fibonacci").is_ok());
//! assert!(validate_action_name("/robot/navigate").is_ok());
//! assert!(validate_action_name("~/dock").is_ok());
//!
//! assert!(validate_action_name("").is_err());
//! assert!(validate_action_name("9lives").is_err());
//! assert!(validate_action_name("a//b").is_err());
//! ```

use crate::error::{Error, Result};

fn invalid(name: &str, reason: impl Into<String>) -> Error {
    Error::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate an action name.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the name violates any of the rules above.
pub fn validate_action_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name must not be empty"));
    }

    let body = if let Some(rest) = name.strip_prefix("~/") {
        rest
    } else if name == "~" {
        return Err(invalid(name, "tilde (~) must be followed by a name"));
    } else if let Some(rest) = name.strip_prefix('/') {
        rest
    } else {
        name
    };

    if body.is_empty() {
        return Err(invalid(name, "name must contain at least one token"));
    }
    if body.ends_with('/') {
        return Err(invalid(name, "name must not end with a forward slash (/)"));
    }
    if body.contains("//") {
        return Err(invalid(name, "name must not contain repeated forward slashes"));
    }
    if body.contains("__") {
        return Err(invalid(name, "name must not contain repeated underscores"));
    }

    for token in body.split('/') {
        if token.is_empty() {
            return Err(invalid(name, "name must not contain empty tokens"));
        }
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid(
                name,
                format!("token '{token}' must not start with a numeric character"),
            ));
        }
        if let Some(c) = token
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
        {
            return Err(invalid(name, format!("invalid character '{c}'")));
        }
    }

    Ok(())
}

/// The service and topic names of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNames {
    pub action: String,
    pub send_goal: String,
    pub get_result: String,
    pub cancel_goal: String,
    pub feedback: String,
    pub status: String,
}

impl ActionNames {
    /// Validate `action_name` and derive its entity names.
    pub fn new(action_name: &str) -> Result<Self> {
        validate_action_name(action_name)?;
        let prefix = format!("{action_name}/_action");
        Ok(Self {
            action: action_name.to_string(),
            send_goal: format!("{prefix}/send_goal"),
            get_result: format!("{prefix}/get_result"),
            cancel_goal: format!("{prefix}/cancel_goal"),
            feedback: format!("{prefix}/feedback"),
            status: format!("{prefix}/status"),
        })
    }

    /// The three request endpoints.
    pub fn services(&self) -> [&str; 3] {
        [&self.send_goal, &self.get_result, &self.cancel_goal]
    }
}
