use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campushub_core::{CourseId, DomainError, DomainResult, ProgramId, UserId};

/// Active registration of a user in a program.
///
/// At most one of these exists per user at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEnrollment {
    pub user_id: UserId,
    pub program_id: ProgramId,
    pub enrolled_at: DateTime<Utc>,
}

/// Active registration of a user in a course.
///
/// Valid only while the user is enrolled in the course's owning program;
/// unsubscribing from the program cascades these away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
}

/// Gate for program subscription: a user with any active program
/// enrollment must unsubscribe before joining another.
pub fn ensure_can_subscribe_program(current: Option<ProgramId>) -> DomainResult<()> {
    if current.is_some() {
        return Err(DomainError::conflict(
            "You are already subscribed to a program. Unsubscribe first.",
        ));
    }
    Ok(())
}

/// Gate for course subscription.
///
/// `enrolled_program` is the user's active program enrollment (if any),
/// `owning_program` the program the course belongs to, `already_enrolled`
/// whether a (user, course) row already exists.
pub fn ensure_can_subscribe_course(
    enrolled_program: Option<ProgramId>,
    owning_program: ProgramId,
    already_enrolled: bool,
) -> DomainResult<()> {
    if enrolled_program != Some(owning_program) {
        return Err(DomainError::precondition(
            "You must be subscribed to the program to enroll in this course",
        ));
    }
    if already_enrolled {
        return Err(DomainError::conflict("Already subscribed to this course"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_program_subscription_is_allowed() {
        assert!(ensure_can_subscribe_program(None).is_ok());
    }

    #[test]
    fn second_program_subscription_conflicts() {
        let err = ensure_can_subscribe_program(Some(ProgramId::new())).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn course_subscription_requires_owning_program() {
        let owning = ProgramId::new();

        // Not enrolled anywhere.
        let err = ensure_can_subscribe_course(None, owning, false).unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));

        // Enrolled in a different program.
        let err = ensure_can_subscribe_course(Some(ProgramId::new()), owning, false).unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));

        // Enrolled in the owning program.
        assert!(ensure_can_subscribe_course(Some(owning), owning, false).is_ok());
    }

    #[test]
    fn duplicate_course_subscription_conflicts() {
        let owning = ProgramId::new();
        let err = ensure_can_subscribe_course(Some(owning), owning, true).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
