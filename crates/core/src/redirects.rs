//! Redirect table with exact-match lookup.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::RedirectCollisionError;

pub const DEFAULT_REDIRECT_STATUS: u16 = 301;
pub const REDIRECT_STATUSES: &[u16] = &[301, 302, 303, 307, 308];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectRule {
    pub from: String,
    pub to: String,
    pub status: u16,
}

impl RedirectRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            status: DEFAULT_REDIRECT_STATUS,
        }
    }
}

/// Redirect rules in declaration order, indexed by source path.
///
/// Source paths are unique: construction fails with every repeated path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(into = "Vec<RedirectRule>")]
pub struct RedirectTable {
    rules: Vec<RedirectRule>,
    index: HashMap<String, usize>,
}

impl RedirectTable {
    pub fn new(rules: Vec<RedirectRule>) -> Result<Self, Vec<RedirectCollisionError>> {
        let mut index = HashMap::with_capacity(rules.len());
        let mut collisions = Vec::new();

        for (position, rule) in rules.iter().enumerate() {
            if let Some(&first) = index.get(&rule.from) {
                collisions.push(RedirectCollisionError {
                    from_path: rule.from.clone(),
                    first,
                    second: position,
                });
            } else {
                index.insert(rule.from.clone(), position);
            }
        }

        if collisions.is_empty() {
            Ok(Self { rules, index })
        } else {
            Err(collisions)
        }
    }

    /// Exact-match lookup of a request path.
    pub fn apply(&self, request_path: &str) -> Option<&RedirectRule> {
        self.index.get(request_path).map(|&i| &self.rules[i])
    }

    pub fn rules(&self) -> &[RedirectRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<RedirectTable> for Vec<RedirectRule> {
    fn from(table: RedirectTable) -> Self {
        table.rules
    }
}
