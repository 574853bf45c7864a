use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub i64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i64>().map(Self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub sender: User,
    pub recipients: Vec<User>,
    pub created_at: DateTime<Utc>,
}

/// Recipient set for a request that has not been persisted yet.
///
/// Duplicates are collapsed and an empty set is rejected, so every stored
/// request has at least one distinct recipient.
pub fn normalize_recipients(recipients: Vec<User>) -> Result<Vec<User>, DomainError> {
    let mut unique: Vec<User> = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        if !unique.iter().any(|existing| existing.id == recipient.id) {
            unique.push(recipient);
        }
    }

    if unique.is_empty() {
        return Err(DomainError::EmptyRecipients);
    }

    Ok(unique)
}
