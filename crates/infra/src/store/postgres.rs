//! Postgres-backed store implementation.
//!
//! ## Error mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` (unique violation) | `Conflict` | concurrent duplicate enrollment / signup |
//! | `23503` (foreign key violation) | `Precondition` / `NotFound` | referenced catalog row absent |
//! | anything else | `Backend` | connection loss, timeouts, corrupt state |
//!
//! The invariant checks run inside transactions *before* the mutating
//! statement; the constraints are the backstop for two writers passing the
//! same check concurrently.
//!
//! ## Locking
//!
//! `subscribe_course` and `unsubscribe_program` both take a row lock on the
//! user's `users_programs` row (`SELECT ... FOR UPDATE`) so that a course
//! subscribe serializes against the unsubscribe cascade and can never
//! insert a course enrollment that the cascade has already swept past.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use campushub_auth::{Role, User, UserAccount, UserDraft};
use campushub_catalog::{Course, CourseDraft, Program, ProgramDraft};
use campushub_core::{CourseId, MessageId, ProgramId, UserId};
use campushub_enrollment::{ensure_can_subscribe_course, ensure_can_subscribe_program};
use campushub_messaging::{Message, MessageDraft, MessageFilter, MessageStatus, MessageWithSender};

use super::{
    CatalogStore, EnrollmentStore, MessageStore, StoreError, StudentWithEnrollment, UserStore,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Postgres-backed implementation of all store traits.
///
/// Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| backend("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply embedded schema migrations.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "migration failed");
                StoreError::Backend(e.to_string())
            })
    }
}

fn backend(operation: &str, err: sqlx::Error) -> StoreError {
    tracing::error!(operation, error = %err, "database operation failed");
    StoreError::Backend(err.to_string())
}

fn is_pg_error(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|c| c == code)
}

#[derive(Debug, FromRow)]
struct ProgramRow {
    id: Uuid,
    program_code: String,
    name: String,
    description: String,
    term: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    fees: i64,
}

impl From<ProgramRow> for Program {
    fn from(row: ProgramRow) -> Self {
        Program {
            id: ProgramId::from(row.id),
            program_code: row.program_code,
            name: row.name,
            description: row.description,
            term: row.term,
            start_date: row.start_date,
            end_date: row.end_date,
            fees: row.fees,
        }
    }
}

#[derive(Debug, FromRow)]
struct CourseRow {
    id: Uuid,
    course_code: String,
    name: String,
    description: String,
    term: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    program_id: Uuid,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: CourseId::from(row.id),
            course_code: row.course_code,
            name: row.name,
            description: row.description,
            term: row.term,
            start_date: row.start_date,
            end_date: row.end_date,
            program_id: ProgramId::from(row.program_id),
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    birthday: Option<NaiveDate>,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_account(self) -> Result<UserAccount, StoreError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|_| StoreError::Backend(format!("corrupt role in users row {}", self.id)))?;
        Ok(UserAccount {
            user: User {
                id: UserId::from(self.id),
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
                birthday: self.birthday,
                username: self.username,
                role,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }

    fn into_user(self) -> Result<User, StoreError> {
        Ok(self.into_account()?.user)
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, birthday, username, password_hash, role, created_at";
const PROGRAM_COLUMNS: &str =
    "id, program_code, name, description, term, start_date, end_date, fees";
const COURSE_COLUMNS: &str =
    "id, course_code, name, description, term, start_date, end_date, program_id";

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    student_id: Uuid,
    admin_id: Option<Uuid>,
    subject: String,
    body: String,
    status: String,
    sent_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, StoreError> {
        let status: MessageStatus = self.status.parse().map_err(|_| {
            StoreError::Backend(format!("corrupt status in messages row {}", self.id))
        })?;
        Ok(Message {
            id: MessageId::from(self.id),
            student_id: UserId::from(self.student_id),
            admin_id: self.admin_id.map(UserId::from),
            subject: self.subject,
            body: self.body,
            status,
            sent_at: self.sent_at,
        })
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_user(
        &self,
        draft: UserDraft,
        password_hash: String,
    ) -> Result<User, StoreError> {
        let id = UserId::new();
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::from(id))
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(draft.birthday)
        .bind(&draft.username)
        .bind(&password_hash)
        .bind(draft.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_pg_error(&e, UNIQUE_VIOLATION) {
                StoreError::Conflict("Username or email is already taken".to_string())
            } else {
                backend("create_user", e)
            }
        })?;
        row.into_user()
    }

    async fn find_account(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| backend("find_account", e))?;
        row.map(UserRow::into_account).transpose()
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| backend("find_user", e))?;
        row.map(UserRow::into_user).transpose()
    }

    async fn list_students(&self) -> Result<Vec<StudentWithEnrollment>, StoreError> {
        #[derive(Debug, FromRow)]
        struct StudentRow {
            id: Uuid,
            first_name: String,
            last_name: String,
            email: String,
            program_name: Option<String>,
        }

        let students: Vec<StudentRow> = sqlx::query_as(
            "SELECT u.id, u.first_name, u.last_name, u.email, p.name AS program_name \
             FROM users u \
             LEFT JOIN users_programs up ON up.user_id = u.id \
             LEFT JOIN programs p ON p.id = up.program_id \
             WHERE u.role = 'student' \
             ORDER BY u.last_name, u.first_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("list_students", e))?;

        #[derive(Debug, FromRow)]
        struct EnrolledCourseRow {
            user_id: Uuid,
            id: Uuid,
            course_code: String,
            name: String,
            description: String,
            term: String,
            start_date: NaiveDate,
            end_date: NaiveDate,
            program_id: Uuid,
        }

        let enrolled: Vec<EnrolledCourseRow> = sqlx::query_as(
            "SELECT uc.user_id, c.id, c.course_code, c.name, c.description, c.term, \
                    c.start_date, c.end_date, c.program_id \
             FROM users_courses uc \
             JOIN courses c ON c.id = uc.course_id \
             ORDER BY c.course_code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("list_students", e))?;

        let mut by_student: HashMap<Uuid, Vec<Course>> = HashMap::new();
        for row in enrolled {
            by_student.entry(row.user_id).or_default().push(Course {
                id: CourseId::from(row.id),
                course_code: row.course_code,
                name: row.name,
                description: row.description,
                term: row.term,
                start_date: row.start_date,
                end_date: row.end_date,
                program_id: ProgramId::from(row.program_id),
            });
        }

        Ok(students
            .into_iter()
            .map(|s| StudentWithEnrollment {
                id: UserId::from(s.id),
                first_name: s.first_name,
                last_name: s.last_name,
                email: s.email,
                program_name: s.program_name,
                courses: by_student.remove(&s.id).unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let rows: Vec<ProgramRow> = sqlx::query_as(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs ORDER BY program_code"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("list_programs", e))?;
        Ok(rows.into_iter().map(Program::from).collect())
    }

    async fn create_program(&self, draft: ProgramDraft) -> Result<Program, StoreError> {
        let row: ProgramRow = sqlx::query_as(&format!(
            "INSERT INTO programs ({PROGRAM_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(Uuid::from(ProgramId::new()))
        .bind(&draft.program_code)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.term)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.fees)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| backend("create_program", e))?;
        Ok(row.into())
    }

    async fn update_program(
        &self,
        id: ProgramId,
        draft: ProgramDraft,
    ) -> Result<Program, StoreError> {
        let row: Option<ProgramRow> = sqlx::query_as(&format!(
            "UPDATE programs \
             SET program_code = $1, name = $2, description = $3, term = $4, \
                 start_date = $5, end_date = $6, fees = $7 \
             WHERE id = $8 \
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(&draft.program_code)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.term)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.fees)
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("update_program", e))?;
        row.map(Program::from)
            .ok_or_else(|| StoreError::NotFound("Program not found".to_string()))
    }

    async fn delete_program(&self, id: ProgramId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(|e| backend("delete_program", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Program not found".to_string()));
        }
        Ok(())
    }

    async fn list_courses(&self, program_id: Option<ProgramId>) -> Result<Vec<Course>, StoreError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE $1::uuid IS NULL OR program_id = $1 \
             ORDER BY course_code"
        ))
        .bind(program_id.map(Uuid::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("list_courses", e))?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn create_course(&self, draft: CourseDraft) -> Result<Course, StoreError> {
        let row: CourseRow = sqlx::query_as(&format!(
            "INSERT INTO courses ({COURSE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(Uuid::from(CourseId::new()))
        .bind(&draft.course_code)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.term)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(Uuid::from(draft.program_id))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_pg_error(&e, FOREIGN_KEY_VIOLATION) {
                StoreError::Precondition("Referenced program does not exist".to_string())
            } else {
                backend("create_course", e)
            }
        })?;
        Ok(row.into())
    }

    async fn update_course(&self, id: CourseId, draft: CourseDraft) -> Result<Course, StoreError> {
        let row: Option<CourseRow> = sqlx::query_as(&format!(
            "UPDATE courses \
             SET course_code = $1, name = $2, description = $3, term = $4, \
                 start_date = $5, end_date = $6, program_id = $7 \
             WHERE id = $8 \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&draft.course_code)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.term)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(Uuid::from(draft.program_id))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_pg_error(&e, FOREIGN_KEY_VIOLATION) {
                StoreError::Precondition("Referenced program does not exist".to_string())
            } else {
                backend("update_course", e)
            }
        })?;
        row.map(Course::from)
            .ok_or_else(|| StoreError::NotFound("Course not found".to_string()))
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(|e| backend("delete_course", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Course not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for PostgresStore {
    async fn subscribe_program(
        &self,
        user_id: UserId,
        program_id: ProgramId,
    ) -> Result<Program, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| backend("subscribe_program", e))?;

        let current: Option<Uuid> =
            sqlx::query_scalar("SELECT program_id FROM users_programs WHERE user_id = $1")
                .bind(Uuid::from(user_id))
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| backend("subscribe_program", e))?;
        ensure_can_subscribe_program(current.map(ProgramId::from))?;

        sqlx::query(
            "INSERT INTO users_programs (user_id, program_id, enrolled_at) VALUES ($1, $2, NOW())",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(program_id))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_pg_error(&e, UNIQUE_VIOLATION) {
                // Concurrent subscribe won the race; same answer as the
                // pre-check.
                StoreError::Conflict(
                    "You are already subscribed to a program. Unsubscribe first.".to_string(),
                )
            } else if is_pg_error(&e, FOREIGN_KEY_VIOLATION) {
                StoreError::NotFound("Program not found".to_string())
            } else {
                backend("subscribe_program", e)
            }
        })?;

        // Defensive re-fetch of the catalog row inside the transaction.
        let row: Option<ProgramRow> =
            sqlx::query_as(&format!("SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = $1"))
                .bind(Uuid::from(program_id))
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| backend("subscribe_program", e))?;
        let Some(row) = row else {
            return Err(StoreError::NotFound(
                "Program not found after subscription.".to_string(),
            ));
        };

        tx.commit().await.map_err(|e| backend("subscribe_program", e))?;
        Ok(row.into())
    }

    async fn unsubscribe_program(
        &self,
        user_id: UserId,
        program_id: ProgramId,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| backend("unsubscribe_program", e))?;

        // Lock the enrollment edge first: concurrent course subscribes
        // serialize on this row and observe the cascade only as a whole.
        let locked: Option<Uuid> = sqlx::query_scalar(
            "SELECT program_id FROM users_programs \
             WHERE user_id = $1 AND program_id = $2 FOR UPDATE",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(program_id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| backend("unsubscribe_program", e))?;
        if locked.is_none() {
            return Err(StoreError::NotFound(
                "You are not subscribed to this program".to_string(),
            ));
        }

        sqlx::query(
            "DELETE FROM users_courses \
             WHERE user_id = $1 \
               AND course_id IN (SELECT id FROM courses WHERE program_id = $2)",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(program_id))
        .execute(&mut *tx)
        .await
        .map_err(|e| backend("unsubscribe_program", e))?;

        sqlx::query("DELETE FROM users_programs WHERE user_id = $1 AND program_id = $2")
            .bind(Uuid::from(user_id))
            .bind(Uuid::from(program_id))
            .execute(&mut *tx)
            .await
            .map_err(|e| backend("unsubscribe_program", e))?;

        tx.commit()
            .await
            .map_err(|e| backend("unsubscribe_program", e))
    }

    async fn my_program(&self, user_id: UserId) -> Result<Option<Program>, StoreError> {
        let row: Option<ProgramRow> = sqlx::query_as(
            "SELECT p.id, p.program_code, p.name, p.description, p.term, \
                    p.start_date, p.end_date, p.fees \
             FROM programs p \
             JOIN users_programs up ON up.program_id = p.id \
             WHERE up.user_id = $1",
        )
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("my_program", e))?;
        Ok(row.map(Program::from))
    }

    async fn subscribe_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| backend("subscribe_course", e))?;

        let owning: Option<Uuid> =
            sqlx::query_scalar("SELECT program_id FROM courses WHERE id = $1")
                .bind(Uuid::from(course_id))
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| backend("subscribe_course", e))?;
        let Some(owning) = owning else {
            return Err(StoreError::NotFound("Course not found".to_string()));
        };

        // Locks the enrollment edge against a concurrent program
        // unsubscribe (see module docs).
        let enrolled: Option<Uuid> = sqlx::query_scalar(
            "SELECT program_id FROM users_programs WHERE user_id = $1 FOR UPDATE",
        )
        .bind(Uuid::from(user_id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| backend("subscribe_course", e))?;

        let already: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM users_courses WHERE user_id = $1 AND course_id = $2",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(course_id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| backend("subscribe_course", e))?;

        ensure_can_subscribe_course(
            enrolled.map(ProgramId::from),
            ProgramId::from(owning),
            already.is_some(),
        )?;

        sqlx::query(
            "INSERT INTO users_courses (user_id, course_id, enrolled_at) VALUES ($1, $2, NOW())",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(course_id))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_pg_error(&e, UNIQUE_VIOLATION) {
                StoreError::Conflict("Already subscribed to this course".to_string())
            } else {
                backend("subscribe_course", e)
            }
        })?;

        tx.commit().await.map_err(|e| backend("subscribe_course", e))
    }

    async fn unsubscribe_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("DELETE FROM users_courses WHERE user_id = $1 AND course_id = $2")
                .bind(Uuid::from(user_id))
                .bind(Uuid::from(course_id))
                .execute(&self.pool)
                .await
                .map_err(|e| backend("unsubscribe_course", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(
                "You are not subscribed to this course".to_string(),
            ));
        }
        Ok(())
    }

    async fn my_courses(&self, user_id: UserId) -> Result<Vec<Course>, StoreError> {
        let rows: Vec<CourseRow> = sqlx::query_as(
            "SELECT c.id, c.course_code, c.name, c.description, c.term, \
                    c.start_date, c.end_date, c.program_id \
             FROM courses c \
             JOIN users_courses uc ON uc.course_id = c.id \
             WHERE uc.user_id = $1 \
             ORDER BY uc.enrolled_at",
        )
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("my_courses", e))?;
        Ok(rows.into_iter().map(Course::from).collect())
    }
}

#[async_trait]
impl MessageStore for PostgresStore {
    async fn insert_message(
        &self,
        student_id: UserId,
        draft: MessageDraft,
    ) -> Result<Message, StoreError> {
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO messages (id, student_id, admin_id, subject, body, status, sent_at) \
             VALUES ($1, $2, NULL, $3, $4, 'open', NOW()) \
             RETURNING id, student_id, admin_id, subject, body, status, sent_at",
        )
        .bind(Uuid::from(MessageId::new()))
        .bind(Uuid::from(student_id))
        .bind(&draft.subject)
        .bind(&draft.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| backend("insert_message", e))?;
        row.into_message()
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> Result<Vec<MessageWithSender>, StoreError> {
        #[derive(Debug, FromRow)]
        struct InboxRow {
            id: Uuid,
            subject: String,
            body: String,
            status: String,
            sent_at: DateTime<Utc>,
            student_name: String,
            student_email: String,
        }

        let rows: Vec<InboxRow> = sqlx::query_as(
            "SELECT m.id, m.subject, m.body, m.status, m.sent_at, \
                    u.first_name || ' ' || u.last_name AS student_name, \
                    u.email AS student_email \
             FROM messages m \
             JOIN users u ON u.id = m.student_id \
             WHERE ($1::text IS NULL OR (u.first_name || ' ' || u.last_name) ILIKE '%' || $1 || '%') \
               AND ($2::text IS NULL OR m.subject ILIKE '%' || $2 || '%') \
               AND ($3::text IS NULL OR m.status = $3) \
             ORDER BY m.sent_at DESC",
        )
        .bind(filter.name.as_deref())
        .bind(filter.subject.as_deref())
        .bind(filter.status.map(MessageStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("list_messages", e))?;

        rows.into_iter()
            .map(|row| {
                let status: MessageStatus = row.status.parse().map_err(|_| {
                    StoreError::Backend(format!("corrupt status in messages row {}", row.id))
                })?;
                Ok(MessageWithSender {
                    id: MessageId::from(row.id),
                    subject: row.subject,
                    body: row.body,
                    status,
                    sent_at: row.sent_at,
                    student_name: row.student_name,
                    student_email: row.student_email,
                })
            })
            .collect()
    }

    async fn resolve_message(&self, id: MessageId) -> Result<Message, StoreError> {
        let row: Option<MessageRow> = sqlx::query_as(
            "UPDATE messages SET status = 'resolved' WHERE id = $1 \
             RETURNING id, student_id, admin_id, subject, body, status, sent_at",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("resolve_message", e))?;
        row.ok_or_else(|| StoreError::NotFound("Message not found.".to_string()))?
            .into_message()
    }
}
