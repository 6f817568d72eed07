//! Rule definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use grindvakt_core::Connection;

use crate::Operator;

/// What a matched rule does with the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Deny,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Deny => "deny",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a decided rule stays in force.
///
/// `Once` rules apply to a single decision and never enter the store;
/// `UntilRestart` rules live in the in-memory store only; `Always` rules are
/// persisted to the rule directory as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    Once,
    UntilRestart,
    Always,
}

/// One firewall rule. Immutable once created; ordering and storage are owned
/// by the [`RuleStore`](crate::RuleStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub action: Action,
    pub duration: Duration,
    pub operator: Operator,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        action: Action,
        duration: Duration,
        operator: Operator,
    ) -> Self {
        Self {
            name: name.into(),
            action,
            duration,
            operator,
        }
    }

    /// Whether this rule's predicate is satisfied by the connection.
    pub fn matches(&self, con: &Connection) -> bool {
        self.operator.matches(con)
    }
}
