//! User accounts (students and admins).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use campushub_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// A user account's public profile.
///
/// Credential material never appears here; the stored password hash lives
/// on [`UserAccount`], which is only used on the login path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", as rendered in the admin inbox and roster.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user together with their stored credential hash.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

/// Validated signup payload (profile fields only; the raw password is
/// hashed separately and handed to the store alongside this draft).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub username: String,
    pub role: Role,
}

impl UserDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::validation("first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::validation("last name is required"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email address is invalid"));
        }
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("username is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UserDraft {
        UserDraft {
            first_name: "Ann".to_string(),
            last_name: "Chovey".to_string(),
            email: "ann@example.com".to_string(),
            phone: None,
            birthday: None,
            username: "annc".to_string(),
            role: Role::Student,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut d = draft();
        d.email = "not-an-email".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn blank_username_is_rejected() {
        let mut d = draft();
        d.username = "  ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let user = User {
            id: UserId::new(),
            first_name: "Ann".to_string(),
            last_name: "Chovey".to_string(),
            email: "ann@example.com".to_string(),
            phone: None,
            birthday: None,
            username: "annc".to_string(),
            role: Role::Student,
            created_at: Utc::now(),
        };
        assert_eq!(user.full_name(), "Ann Chovey");
    }
}
