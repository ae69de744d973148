// ============================================================================
// Phonebook Core - Worker Search
// File: crates/phonebook-core/src/services/search.rs
// ============================================================================
//! Tokenized, conjunctive prefix search over worker records.
//!
//! Every whitespace-separated token must prefix-match at least one of
//! [`SEARCH_FIELDS`] (case-insensitive, anchored at the start of the
//! value). Tokens are combined with AND, so extra words narrow results.

use crate::domain::{Worker, WorkerProfile};
use crate::error::DomainError;

/// Columns a token may match, in the order they are tried.
pub const SEARCH_FIELDS: [&str; 5] = ["surname", "name", "middle_name", "email", "cabinet"];

/// Department/section narrowing shared by listing and search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerFilter {
    department: Option<String>,
    section: Option<String>,
}

impl WorkerFilter {
    /// A section is only meaningful inside a department; asking for one
    /// without the other is rejected.
    pub fn new(department: Option<&str>, section: Option<&str>) -> Result<Self, DomainError> {
        let department = department.map(str::trim).filter(|d| !d.is_empty());
        let section = section.map(str::trim).filter(|s| !s.is_empty());
        if section.is_some() && department.is_none() {
            return Err(DomainError::ValidationError(
                "section filter requires a department filter".into(),
            ));
        }
        Ok(Self {
            department: department.map(str::to_string),
            section: section.map(str::to_string),
        })
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn matches(&self, profile: &WorkerProfile) -> bool {
        let department_ok = match &self.department {
            Some(d) => profile.department.as_deref() == Some(d.as_str()),
            None => true,
        };
        let section_ok = match &self.section {
            Some(s) => profile.section.as_deref() == Some(s.as_str()),
            None => true,
        };
        department_ok && section_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    tokens: Vec<String>,
    filter: WorkerFilter,
}

impl SearchQuery {
    pub fn new(text: &str, filter: WorkerFilter) -> Self {
        Self { tokens: tokenize(text), filter }
    }

    /// Lowercased tokens, in query order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn filter(&self) -> &WorkerFilter {
        &self.filter
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches(&self, profile: &WorkerProfile) -> bool {
        !self.tokens.is_empty()
            && self.filter.matches(profile)
            && self.tokens.iter().all(|token| token_matches(token, profile))
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn token_matches(token: &str, profile: &WorkerProfile) -> bool {
    let fields = [
        Some(profile.surname.as_str()),
        Some(profile.name.as_str()),
        profile.middle_name.as_deref(),
        Some(profile.email.as_str()),
        profile.cabinet.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|value| has_prefix_ci(value, token))
}

/// `token` must already be lowercase.
pub fn has_prefix_ci(value: &str, token: &str) -> bool {
    value.to_lowercase().starts_with(token)
}

/// Escapes `LIKE` metacharacters so a token is matched literally; pair with
/// `ESCAPE '\'`.
pub fn escape_like(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Result order for every worker listing: surname, then given name, then id.
///
/// Names compare case-insensitively by code point, matching
/// `lower(..) COLLATE "C"` on the database side.
pub fn sort_workers(workers: &mut [Worker]) {
    workers.sort_by_cached_key(|w| {
        (w.profile.surname.to_lowercase(), w.profile.name.to_lowercase(), w.id)
    });
}
