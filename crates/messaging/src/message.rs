use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campushub_core::{DomainError, DomainResult, MessageId, UserId};

/// Ticket status. Transitions are monotonic: `open → resolved`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Open,
    Resolved,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Open => "open",
            MessageStatus::Resolved => "resolved",
        }
    }
}

impl core::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(MessageStatus::Open),
            "resolved" => Ok(MessageStatus::Resolved),
            other => Err(DomainError::validation(format!(
                "unknown status '{other}', expected 'open' or 'resolved'"
            ))),
        }
    }
}

/// A student-authored support ticket.
///
/// Never deleted; an admin may resolve it (once or repeatedly, the status
/// stays `resolved`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub student_id: UserId,
    /// Admin the ticket is routed to; unassigned on creation.
    pub admin_id: Option<UserId>,
    pub subject: String,
    pub body: String,
    pub status: MessageStatus,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Monotonic status transition. Resolving an already-resolved ticket
    /// is a successful no-op.
    pub fn resolve(&mut self) {
        self.status = MessageStatus::Resolved;
    }
}

/// New-ticket payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageDraft {
    pub subject: String,
    pub body: String,
}

impl MessageDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.subject.trim().is_empty() || self.body.trim().is_empty() {
            return Err(DomainError::validation("Subject and message are required."));
        }
        Ok(())
    }

    pub fn into_message(self, id: MessageId, student_id: UserId, sent_at: DateTime<Utc>) -> Message {
        Message {
            id,
            student_id,
            admin_id: None,
            subject: self.subject,
            body: self.body,
            status: MessageStatus::Open,
            sent_at,
        }
    }
}

/// Admin inbox filter: substring matches are case-insensitive, status is
/// exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub status: Option<MessageStatus>,
}

impl MessageFilter {
    /// Decide whether a ticket (with its sender's display name) passes the
    /// filter. The SQL store expresses the same predicate with `ILIKE`.
    pub fn matches(&self, student_name: &str, subject: &str, status: MessageStatus) -> bool {
        if let Some(name) = &self.name {
            if !student_name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(wanted) = &self.subject {
            if !subject.to_lowercase().contains(&wanted.to_lowercase()) {
                return false;
            }
        }
        if let Some(wanted) = self.status {
            if status != wanted {
                return false;
            }
        }
        true
    }
}

/// Admin inbox row: a ticket joined with its sender's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageWithSender {
    pub id: MessageId,
    pub subject: String,
    pub body: String,
    pub status: MessageStatus,
    pub sent_at: DateTime<Utc>,
    pub student_name: String,
    pub student_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        MessageDraft {
            subject: "Enrollment question".to_string(),
            body: "Which term does CS-101 run in?".to_string(),
        }
        .into_message(MessageId::new(), UserId::new(), Utc::now())
    }

    #[test]
    fn new_messages_start_open_and_unassigned() {
        let m = message();
        assert_eq!(m.status, MessageStatus::Open);
        assert!(m.admin_id.is_none());
    }

    #[test]
    fn resolve_is_monotonic() {
        let mut m = message();
        m.resolve();
        assert_eq!(m.status, MessageStatus::Resolved);
        m.resolve();
        assert_eq!(m.status, MessageStatus::Resolved);
    }

    #[test]
    fn blank_subject_or_body_is_rejected() {
        let blank_subject = MessageDraft {
            subject: "  ".to_string(),
            body: "hello".to_string(),
        };
        assert!(blank_subject.validate().is_err());

        let blank_body = MessageDraft {
            subject: "hello".to_string(),
            body: String::new(),
        };
        assert!(blank_body.validate().is_err());
    }

    #[test]
    fn filter_matches_name_case_insensitively() {
        let filter = MessageFilter {
            name: Some("ann".to_string()),
            ..MessageFilter::default()
        };
        assert!(filter.matches("Ann Chovey", "anything", MessageStatus::Open));
        assert!(filter.matches("JoANNa Doe", "anything", MessageStatus::Resolved));
        assert!(!filter.matches("Bob Ross", "anything", MessageStatus::Open));
    }

    #[test]
    fn filter_combines_subject_and_status() {
        let filter = MessageFilter {
            name: None,
            subject: Some("fees".to_string()),
            status: Some(MessageStatus::Open),
        };
        assert!(filter.matches("Ann", "Question about FEES", MessageStatus::Open));
        assert!(!filter.matches("Ann", "Question about FEES", MessageStatus::Resolved));
        assert!(!filter.matches("Ann", "Other topic", MessageStatus::Open));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MessageFilter::default();
        assert!(filter.matches("Anyone", "Anything", MessageStatus::Resolved));
    }
}
