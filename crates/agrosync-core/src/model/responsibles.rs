// ── Facility alert recipients ──
//
// A facility's responsibles are a set of email addresses. Order carries no
// meaning to the backend; insertion order is kept for display.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

/// A syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate operator input. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::validation("Email cannot be empty"));
        }
        if !EMAIL_RE.is_match(trimmed) {
            return Err(CoreError::validation("Invalid email format"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Wrap an address the backend already stores. Not re-validated so a
    /// legacy entry can still be listed and removed.
    pub(crate) fn from_server(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The alert recipients of one facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsibleSet(IndexSet<EmailAddress>);

impl ResponsibleSet {
    pub fn from_server(emails: impl IntoIterator<Item = String>) -> Self {
        Self(emails.into_iter().map(EmailAddress::from_server).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, email: &EmailAddress) -> bool {
        self.0.contains(email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmailAddress> {
        self.0.iter()
    }

    /// The proposed set after adding `raw`. Fails without touching `self`.
    pub fn with_added(&self, raw: &str) -> Result<Self, CoreError> {
        let email = EmailAddress::parse(raw)?;
        if self.0.contains(&email) {
            return Err(CoreError::validation("Email already added"));
        }
        let mut next = self.0.clone();
        next.insert(email);
        Ok(Self(next))
    }

    /// The proposed set after removing `raw`.
    pub fn with_removed(&self, raw: &str) -> Result<Self, CoreError> {
        let email = EmailAddress::from_server(raw.trim().to_owned());
        if !self.0.contains(&email) {
            return Err(CoreError::validation("Email not registered"));
        }
        let mut next = self.0.clone();
        next.shift_remove(&email);
        Ok(Self(next))
    }

    /// Wire form for the full-list replacement.
    pub fn to_wire(&self) -> Vec<String> {
        self.0.iter().map(|e| e.0.clone()).collect()
    }
}
