//! Request DTOs and their mapping into domain types.
//!
//! Success responses are built inline with `serde_json::json!`; domain
//! types serialize directly.

use chrono::NaiveDate;
use serde::Deserialize;

use campushub_auth::{Role, UserDraft};
use campushub_core::{DomainError, DomainResult};
use campushub_messaging::{MessageDraft, MessageFilter, MessageStatus};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl SignupRequest {
    /// Split into a validated profile draft and the raw password.
    pub fn into_parts(self) -> DomainResult<(UserDraft, String)> {
        if self.password.trim().is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        let draft = UserDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            birthday: self.birthday,
            username: self.username,
            role: self.role,
        };
        draft.validate()?;
        Ok((draft, self.password))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// New-ticket body. Fields arrive optional so an omitted field reports the
/// same validation error as a blank one.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageRequest {
    pub fn into_draft(self) -> DomainResult<MessageDraft> {
        let draft = MessageDraft {
            subject: self.subject.unwrap_or_default(),
            body: self.message.unwrap_or_default(),
        };
        draft.validate()?;
        Ok(draft)
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub status: Option<String>,
}

impl MessageListQuery {
    pub fn into_filter(self) -> DomainResult<MessageFilter> {
        let status = self
            .status
            .map(|s| s.parse::<MessageStatus>())
            .transpose()?;
        Ok(MessageFilter {
            name: self.name,
            subject: self.subject,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseListQuery {
    pub program_id: Option<campushub_core::ProgramId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_defaults_to_student_role() {
        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ann",
            "last_name": "Chovey",
            "email": "ann@example.com",
            "username": "annc",
            "password": "hunter2!",
        }))
        .unwrap();
        assert_eq!(req.role, Role::Student);
    }

    #[test]
    fn blank_password_is_rejected() {
        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ann",
            "last_name": "Chovey",
            "email": "ann@example.com",
            "username": "annc",
            "password": "  ",
        }))
        .unwrap();
        assert!(req.into_parts().is_err());
    }

    #[test]
    fn missing_message_body_is_rejected() {
        let req = MessageRequest {
            subject: Some("Hello".to_string()),
            message: None,
        };
        assert!(req.into_draft().is_err());
    }

    #[test]
    fn bad_status_filter_is_rejected() {
        let query = MessageListQuery {
            name: None,
            subject: None,
            status: Some("closed".to_string()),
        };
        assert!(query.into_filter().is_err());
    }
}
