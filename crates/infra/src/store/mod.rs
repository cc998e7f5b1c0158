//! Store boundary: one trait per domain area, implemented by a Postgres
//! store (production) and an in-memory store (tests/dev).
//!
//! Implementations own atomicity. The multi-statement operations —
//! the program-unsubscribe cascade and both subscribe check-then-insert
//! sequences — must not be observable half-applied: the Postgres store
//! wraps them in transactions, the in-memory store in a single write
//! guard. Both route their invariant decisions through the pure checks in
//! `campushub-enrollment` so the business rules live in exactly one place.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use campushub_auth::{User, UserAccount, UserDraft};
use campushub_catalog::{Course, CourseDraft, Program, ProgramDraft};
use campushub_core::{CourseId, DomainError, MessageId, ProgramId, UserId};
use campushub_messaging::{Message, MessageDraft, MessageFilter, MessageWithSender};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Store operation error.
///
/// `Conflict`, `Precondition`, and `NotFound` carry caller-facing
/// messages; `Backend` wraps unexpected database failures, which are
/// logged at the point of wrapping and rendered generically at the API
/// boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Precondition(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Conflict(m) => StoreError::Conflict(m),
            DomainError::Precondition(m) => StoreError::Precondition(m),
            DomainError::NotFound(m) => StoreError::NotFound(m),
            DomainError::Validation(m) | DomainError::InvalidId(m) => StoreError::Precondition(m),
        }
    }
}

/// Admin roster row: a student joined with their program and courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentWithEnrollment {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub program_name: Option<String>,
    pub courses: Vec<Course>,
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Duplicate username or email is a `Conflict`.
    async fn create_user(
        &self,
        draft: UserDraft,
        password_hash: String,
    ) -> Result<User, StoreError>;

    /// Look up an account (profile + credential hash) for login.
    async fn find_account(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Every student with their program and enrolled courses, read through
    /// the join relations.
    async fn list_students(&self) -> Result<Vec<StudentWithEnrollment>, StoreError>;
}

/// Admin-managed program/course catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_programs(&self) -> Result<Vec<Program>, StoreError>;
    async fn create_program(&self, draft: ProgramDraft) -> Result<Program, StoreError>;
    async fn update_program(
        &self,
        id: ProgramId,
        draft: ProgramDraft,
    ) -> Result<Program, StoreError>;
    async fn delete_program(&self, id: ProgramId) -> Result<(), StoreError>;

    async fn list_courses(&self, program_id: Option<ProgramId>) -> Result<Vec<Course>, StoreError>;
    async fn create_course(&self, draft: CourseDraft) -> Result<Course, StoreError>;
    async fn update_course(&self, id: CourseId, draft: CourseDraft) -> Result<Course, StoreError>;
    async fn delete_course(&self, id: CourseId) -> Result<(), StoreError>;
}

/// Subscribe/unsubscribe operations and the reads supporting them.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Enroll the user in a program. `Conflict` if any program enrollment
    /// already exists for the user; the check and the insert are atomic.
    async fn subscribe_program(
        &self,
        user_id: UserId,
        program_id: ProgramId,
    ) -> Result<Program, StoreError>;

    /// Leave a program, cascading away this user's course enrollments in
    /// it. `NotFound` (with nothing applied) if the user was not enrolled.
    async fn unsubscribe_program(
        &self,
        user_id: UserId,
        program_id: ProgramId,
    ) -> Result<(), StoreError>;

    async fn my_program(&self, user_id: UserId) -> Result<Option<Program>, StoreError>;

    /// Enroll the user in a course. `Precondition` unless the user is
    /// enrolled in the course's owning program; `Conflict` on duplicates.
    async fn subscribe_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), StoreError>;

    async fn unsubscribe_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), StoreError>;

    async fn my_courses(&self, user_id: UserId) -> Result<Vec<Course>, StoreError>;
}

/// Support tickets.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(
        &self,
        student_id: UserId,
        draft: MessageDraft,
    ) -> Result<Message, StoreError>;

    /// Admin inbox, newest first.
    async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> Result<Vec<MessageWithSender>, StoreError>;

    /// Mark resolved. Succeeds again on an already-resolved ticket.
    async fn resolve_message(&self, id: MessageId) -> Result<Message, StoreError>;
}

/// Umbrella trait for handler wiring (`Arc<dyn Store>`).
pub trait Store: UserStore + CatalogStore + EnrollmentStore + MessageStore {}

impl<T> Store for T where T: UserStore + CatalogStore + EnrollmentStore + MessageStore {}
