//! Opaque upload-session identifier.
//!
//! A ticket scopes one client's uploads, readiness checks, and merge. It is
//! minted once per session and embedded in object keys (`{ticket}/{file}`),
//! so parsed values are validated for key safety before use.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TicketParseError {
    #[error("ticket is empty")]
    Empty,
    #[error("ticket contains a path component: {0:?}")]
    UnsafeCharacters(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticket(String);

impl Ticket {
    /// Mints a fresh session ticket.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validates an externally supplied ticket string.
    pub fn parse(raw: &str) -> Result<Self, TicketParseError> {
        if raw.is_empty() {
            return Err(TicketParseError::Empty);
        }
        if raw.contains('/') || raw.contains('\\') || raw.contains("..") {
            return Err(TicketParseError::UnsafeCharacters(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticket {
    type Error = TicketParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticket::parse(&value)
    }
}

impl From<Ticket> for String {
    fn from(ticket: Ticket) -> Self {
        ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tickets_are_unique() {
        assert_ne!(Ticket::generate(), Ticket::generate());
    }

    #[test]
    fn test_parse_accepts_uuid_shape() {
        let t = Ticket::parse("70ac51ed-d34d-417e-887c-64cd1edd3c42").unwrap();
        assert_eq!(t.as_str(), "70ac51ed-d34d-417e-887c-64cd1edd3c42");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(Ticket::parse(""), Err(TicketParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_path_components() {
        for raw in ["a/b", "a\\b", "../etc", "a..b"] {
            assert!(Ticket::parse(raw).is_err(), "accepted {raw:?}");
        }
    }
}
