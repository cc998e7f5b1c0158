//! In-memory store.
//!
//! Intended for tests/dev. Every operation takes a single lock guard, so
//! the multi-step invariants are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use campushub_auth::{User, UserAccount, UserDraft};
use campushub_catalog::{Course, CourseDraft, Program, ProgramDraft};
use campushub_core::{CourseId, MessageId, ProgramId, UserId};
use campushub_enrollment::{
    CourseEnrollment, ProgramEnrollment, ensure_can_subscribe_course, ensure_can_subscribe_program,
};
use campushub_messaging::{Message, MessageDraft, MessageFilter, MessageWithSender};

use super::{
    CatalogStore, EnrollmentStore, MessageStore, StoreError, StudentWithEnrollment, UserStore,
};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserAccount>,
    programs: HashMap<ProgramId, Program>,
    courses: HashMap<CourseId, Course>,
    // Keyed by user: the single-active-program invariant is structural.
    program_enrollments: HashMap<UserId, ProgramEnrollment>,
    course_enrollments: Vec<CourseEnrollment>,
    messages: Vec<Message>,
}

/// In-memory implementation of all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        draft: UserDraft,
        password_hash: String,
    ) -> Result<User, StoreError> {
        let mut inner = self.write()?;

        let taken = inner
            .users
            .values()
            .any(|a| a.user.username == draft.username || a.user.email == draft.email);
        if taken {
            return Err(StoreError::Conflict(
                "Username or email is already taken".to_string(),
            ));
        }

        let user = User {
            id: UserId::new(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            birthday: draft.birthday,
            username: draft.username,
            role: draft.role,
            created_at: Utc::now(),
        };
        inner.users.insert(
            user.id,
            UserAccount {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    async fn find_account(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .users
            .values()
            .find(|a| a.user.username == username)
            .cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.read()?;
        Ok(inner.users.get(&id).map(|a| a.user.clone()))
    }

    async fn list_students(&self) -> Result<Vec<StudentWithEnrollment>, StoreError> {
        let inner = self.read()?;

        let mut students: Vec<&User> = inner
            .users
            .values()
            .map(|a| &a.user)
            .filter(|u| !u.role.is_admin())
            .collect();
        students.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));

        let roster = students
            .into_iter()
            .map(|user| {
                let program_name = inner
                    .program_enrollments
                    .get(&user.id)
                    .and_then(|e| inner.programs.get(&e.program_id))
                    .map(|p| p.name.clone());
                let courses = inner
                    .course_enrollments
                    .iter()
                    .filter(|e| e.user_id == user.id)
                    .filter_map(|e| inner.courses.get(&e.course_id))
                    .cloned()
                    .collect();
                StudentWithEnrollment {
                    id: user.id,
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    email: user.email.clone(),
                    program_name,
                    courses,
                }
            })
            .collect();
        Ok(roster)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let inner = self.read()?;
        let mut programs: Vec<Program> = inner.programs.values().cloned().collect();
        programs.sort_by(|a, b| a.program_code.cmp(&b.program_code));
        Ok(programs)
    }

    async fn create_program(&self, draft: ProgramDraft) -> Result<Program, StoreError> {
        let mut inner = self.write()?;
        let program = draft.into_program(ProgramId::new());
        inner.programs.insert(program.id, program.clone());
        Ok(program)
    }

    async fn update_program(
        &self,
        id: ProgramId,
        draft: ProgramDraft,
    ) -> Result<Program, StoreError> {
        let mut inner = self.write()?;
        if !inner.programs.contains_key(&id) {
            return Err(StoreError::NotFound("Program not found".to_string()));
        }
        let program = draft.into_program(id);
        inner.programs.insert(id, program.clone());
        Ok(program)
    }

    async fn delete_program(&self, id: ProgramId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.programs.remove(&id).is_none() {
            return Err(StoreError::NotFound("Program not found".to_string()));
        }
        // Mirror the schema's ON DELETE CASCADE chain.
        let removed: Vec<CourseId> = inner
            .courses
            .values()
            .filter(|c| c.program_id == id)
            .map(|c| c.id)
            .collect();
        inner.courses.retain(|_, c| c.program_id != id);
        inner
            .course_enrollments
            .retain(|e| !removed.contains(&e.course_id));
        inner.program_enrollments.retain(|_, e| e.program_id != id);
        Ok(())
    }

    async fn list_courses(&self, program_id: Option<ProgramId>) -> Result<Vec<Course>, StoreError> {
        let inner = self.read()?;
        let mut courses: Vec<Course> = inner
            .courses
            .values()
            .filter(|c| program_id.is_none_or(|p| c.program_id == p))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.course_code.cmp(&b.course_code));
        Ok(courses)
    }

    async fn create_course(&self, draft: CourseDraft) -> Result<Course, StoreError> {
        let mut inner = self.write()?;
        if !inner.programs.contains_key(&draft.program_id) {
            return Err(StoreError::Precondition(
                "Referenced program does not exist".to_string(),
            ));
        }
        let course = draft.into_course(CourseId::new());
        inner.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: CourseId, draft: CourseDraft) -> Result<Course, StoreError> {
        let mut inner = self.write()?;
        if !inner.courses.contains_key(&id) {
            return Err(StoreError::NotFound("Course not found".to_string()));
        }
        if !inner.programs.contains_key(&draft.program_id) {
            return Err(StoreError::Precondition(
                "Referenced program does not exist".to_string(),
            ));
        }
        let course = draft.into_course(id);
        inner.courses.insert(id, course.clone());
        Ok(course)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.courses.remove(&id).is_none() {
            return Err(StoreError::NotFound("Course not found".to_string()));
        }
        inner.course_enrollments.retain(|e| e.course_id != id);
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn subscribe_program(
        &self,
        user_id: UserId,
        program_id: ProgramId,
    ) -> Result<Program, StoreError> {
        let mut inner = self.write()?;

        let current = inner.program_enrollments.get(&user_id).map(|e| e.program_id);
        ensure_can_subscribe_program(current)?;

        inner.program_enrollments.insert(
            user_id,
            ProgramEnrollment {
                user_id,
                program_id,
                enrolled_at: Utc::now(),
            },
        );

        // Defensive re-fetch: the catalog row may have been deleted out
        // from under the subscribe.
        let program = inner.programs.get(&program_id).cloned();
        match program {
            Some(program) => Ok(program),
            None => {
                inner.program_enrollments.remove(&user_id);
                Err(StoreError::NotFound(
                    "Program not found after subscription.".to_string(),
                ))
            }
        }
    }

    async fn unsubscribe_program(
        &self,
        user_id: UserId,
        program_id: ProgramId,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        let enrolled = inner
            .program_enrollments
            .get(&user_id)
            .is_some_and(|e| e.program_id == program_id);
        if !enrolled {
            return Err(StoreError::NotFound(
                "You are not subscribed to this program".to_string(),
            ));
        }

        // Cascade first, then drop the program edge; both under the same
        // write guard so no reader sees a half-applied state.
        let course_ids: Vec<CourseId> = inner
            .courses
            .values()
            .filter(|c| c.program_id == program_id)
            .map(|c| c.id)
            .collect();
        inner
            .course_enrollments
            .retain(|e| !(e.user_id == user_id && course_ids.contains(&e.course_id)));
        inner.program_enrollments.remove(&user_id);
        Ok(())
    }

    async fn my_program(&self, user_id: UserId) -> Result<Option<Program>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .program_enrollments
            .get(&user_id)
            .and_then(|e| inner.programs.get(&e.program_id))
            .cloned())
    }

    async fn subscribe_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        let owning_program = inner
            .courses
            .get(&course_id)
            .map(|c| c.program_id)
            .ok_or_else(|| StoreError::NotFound("Course not found".to_string()))?;
        let enrolled_program = inner.program_enrollments.get(&user_id).map(|e| e.program_id);
        let already_enrolled = inner
            .course_enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id);

        ensure_can_subscribe_course(enrolled_program, owning_program, already_enrolled)?;

        inner.course_enrollments.push(CourseEnrollment {
            user_id,
            course_id,
            enrolled_at: Utc::now(),
        });
        Ok(())
    }

    async fn unsubscribe_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let before = inner.course_enrollments.len();
        inner
            .course_enrollments
            .retain(|e| !(e.user_id == user_id && e.course_id == course_id));
        if inner.course_enrollments.len() == before {
            return Err(StoreError::NotFound(
                "You are not subscribed to this course".to_string(),
            ));
        }
        Ok(())
    }

    async fn my_courses(&self, user_id: UserId) -> Result<Vec<Course>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .course_enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter_map(|e| inner.courses.get(&e.course_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(
        &self,
        student_id: UserId,
        draft: MessageDraft,
    ) -> Result<Message, StoreError> {
        let mut inner = self.write()?;
        let message = draft.into_message(MessageId::new(), student_id, Utc::now());
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> Result<Vec<MessageWithSender>, StoreError> {
        let inner = self.read()?;

        let mut rows: Vec<MessageWithSender> = inner
            .messages
            .iter()
            .filter_map(|m| {
                let sender = inner.users.get(&m.student_id)?;
                let student_name = sender.user.full_name();
                filter
                    .matches(&student_name, &m.subject, m.status)
                    .then(|| MessageWithSender {
                        id: m.id,
                        subject: m.subject.clone(),
                        body: m.body.clone(),
                        status: m.status,
                        sent_at: m.sent_at,
                        student_name,
                        student_email: sender.user.email.clone(),
                    })
            })
            .collect();
        rows.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(rows)
    }

    async fn resolve_message(&self, id: MessageId) -> Result<Message, StoreError> {
        let mut inner = self.write()?;
        let message = inner
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound("Message not found.".to_string()))?;
        message.resolve();
        Ok(message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use campushub_auth::Role;
    use proptest::prelude::*;

    fn program_draft(code: &str) -> ProgramDraft {
        ProgramDraft {
            program_code: code.to_string(),
            name: format!("Program {code}"),
            description: "desc".to_string(),
            term: "Fall".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
            fees: 3000,
        }
    }

    fn course_draft(code: &str, program_id: ProgramId) -> CourseDraft {
        CourseDraft {
            course_code: code.to_string(),
            name: format!("Course {code}"),
            description: "desc".to_string(),
            term: "Fall".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            program_id,
        }
    }

    fn user_draft(username: &str) -> UserDraft {
        UserDraft {
            first_name: "Ann".to_string(),
            last_name: "Chovey".to_string(),
            email: format!("{username}@example.com"),
            phone: None,
            birthday: None,
            username: username.to_string(),
            role: Role::Student,
        }
    }

    async fn seeded() -> (MemoryStore, UserId, Program, Course, Program, Course) {
        let store = MemoryStore::new();
        let user = store
            .create_user(user_draft("ann"), "hash".to_string())
            .await
            .unwrap();
        let p1 = store.create_program(program_draft("P1")).await.unwrap();
        let p2 = store.create_program(program_draft("P2")).await.unwrap();
        let c1 = store.create_course(course_draft("C1", p1.id)).await.unwrap();
        let c2 = store.create_course(course_draft("C2", p2.id)).await.unwrap();
        (store, user.id, p1, c1, p2, c2)
    }

    #[tokio::test]
    async fn program_subscription_is_exclusive() {
        let (store, user, p1, _c1, p2, _c2) = seeded().await;

        let subscribed = store.subscribe_program(user, p1.id).await.unwrap();
        assert_eq!(subscribed.fees, 3000);
        assert_eq!(subscribed.term, "Fall");

        let err = store.subscribe_program(user, p2.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Still exactly the first program.
        let current = store.my_program(user).await.unwrap().unwrap();
        assert_eq!(current.id, p1.id);
    }

    #[tokio::test]
    async fn course_subscription_requires_owning_program() {
        let (store, user, p1, c1, _p2, c2) = seeded().await;

        // Not enrolled anywhere yet.
        let err = store.subscribe_course(user, c1.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Precondition(_)));

        store.subscribe_program(user, p1.id).await.unwrap();
        store.subscribe_course(user, c1.id).await.unwrap();

        // A course of a different program is still gated.
        let err = store.subscribe_course(user, c2.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Precondition(_)));

        let mine = store.my_courses(user).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, c1.id);
    }

    #[tokio::test]
    async fn duplicate_course_subscription_conflicts_and_keeps_one_row() {
        let (store, user, p1, c1, _p2, _c2) = seeded().await;
        store.subscribe_program(user, p1.id).await.unwrap();
        store.subscribe_course(user, c1.id).await.unwrap();

        let err = store.subscribe_course(user, c1.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.my_courses(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_program_cascades_course_enrollments() {
        let (store, user, p1, c1, _p2, _c2) = seeded().await;
        store.subscribe_program(user, p1.id).await.unwrap();
        store.subscribe_course(user, c1.id).await.unwrap();

        store.unsubscribe_program(user, p1.id).await.unwrap();

        assert!(store.my_program(user).await.unwrap().is_none());
        assert!(store.my_courses(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_program_never_enrolled_is_not_found() {
        let (store, user, p1, c1, p2, _c2) = seeded().await;
        store.subscribe_program(user, p1.id).await.unwrap();
        store.subscribe_course(user, c1.id).await.unwrap();

        // Wrong program: nothing is applied, the cascade does not fire.
        let err = store.unsubscribe_program(user, p2.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.my_courses(user).await.unwrap().len(), 1);
        assert!(store.my_program(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unsubscribe_course_requires_an_existing_row() {
        let (store, user, p1, c1, _p2, _c2) = seeded().await;
        store.subscribe_program(user, p1.id).await.unwrap();

        let err = store.unsubscribe_course(user, c1.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        store.subscribe_course(user, c1.id).await.unwrap();
        store.unsubscribe_course(user, c1.id).await.unwrap();
        assert!(store.my_courses(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn subscribe_vanished_program_is_not_found_and_leaves_no_row() {
        let store = MemoryStore::new();
        let user = store
            .create_user(user_draft("ann"), "hash".to_string())
            .await
            .unwrap();

        let err = store
            .subscribe_program(user.id, ProgramId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.my_program(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store
            .create_user(user_draft("ann"), "hash".to_string())
            .await
            .unwrap();

        let mut dup = user_draft("ann");
        dup.email = "other@example.com".to_string();
        let err = store.create_user(dup, "hash".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn resolve_message_is_idempotent() {
        let store = MemoryStore::new();
        let user = store
            .create_user(user_draft("ann"), "hash".to_string())
            .await
            .unwrap();
        let message = store
            .insert_message(
                user.id,
                MessageDraft {
                    subject: "Hello".to_string(),
                    body: "World".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(message.status, campushub_messaging::MessageStatus::Open);

        let first = store.resolve_message(message.id).await.unwrap();
        let second = store.resolve_message(message.id).await.unwrap();
        assert_eq!(first.status, campushub_messaging::MessageStatus::Resolved);
        assert_eq!(second.status, campushub_messaging::MessageStatus::Resolved);

        let err = store.resolve_message(MessageId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn message_listing_filters_and_orders_newest_first() {
        let store = MemoryStore::new();
        let ann = store
            .create_user(user_draft("ann"), "hash".to_string())
            .await
            .unwrap();
        let mut draft = user_draft("bob");
        draft.first_name = "Bob".to_string();
        draft.last_name = "Ross".to_string();
        let bob = store.create_user(draft, "hash".to_string()).await.unwrap();

        let first = store
            .insert_message(
                ann.id,
                MessageDraft {
                    subject: "Fees question".to_string(),
                    body: "…".to_string(),
                },
            )
            .await
            .unwrap();
        let second = store
            .insert_message(
                bob.id,
                MessageDraft {
                    subject: "Enrollment".to_string(),
                    body: "…".to_string(),
                },
            )
            .await
            .unwrap();
        store.resolve_message(first.id).await.unwrap();

        let all = store.list_messages(&MessageFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].sent_at >= all[1].sent_at);
        assert_eq!(all[0].id, second.id);

        let open_ann = store
            .list_messages(&MessageFilter {
                name: Some("ann".to_string()),
                subject: None,
                status: Some(campushub_messaging::MessageStatus::Open),
            })
            .await
            .unwrap();
        assert!(open_ann.is_empty());

        let resolved_ann = store
            .list_messages(&MessageFilter {
                name: Some("ANN".to_string()),
                subject: None,
                status: Some(campushub_messaging::MessageStatus::Resolved),
            })
            .await
            .unwrap();
        assert_eq!(resolved_ann.len(), 1);
        assert_eq!(resolved_ann[0].id, first.id);
        assert_eq!(resolved_ann[0].student_name, "Ann Chovey");
    }

    #[tokio::test]
    async fn roster_reads_through_the_join_relations() {
        let (store, user, p1, c1, _p2, _c2) = seeded().await;
        store.subscribe_program(user, p1.id).await.unwrap();
        store.subscribe_course(user, c1.id).await.unwrap();

        let roster = store.list_students().await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].program_name.as_deref(), Some(p1.name.as_str()));
        assert_eq!(roster[0].courses.len(), 1);
        assert_eq!(roster[0].courses[0].id, c1.id);
    }

    // Random interleavings of subscribe/unsubscribe must never leave a
    // dangling course enrollment or a second program enrollment.
    #[derive(Debug, Clone, Copy)]
    enum Op {
        SubscribeProgram(usize, usize),
        UnsubscribeProgram(usize, usize),
        SubscribeCourse(usize, usize),
        UnsubscribeCourse(usize, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..3usize, 0..2usize).prop_map(|(u, p)| Op::SubscribeProgram(u, p)),
            (0..3usize, 0..2usize).prop_map(|(u, p)| Op::UnsubscribeProgram(u, p)),
            (0..3usize, 0..4usize).prop_map(|(u, c)| Op::SubscribeCourse(u, c)),
            (0..3usize, 0..4usize).prop_map(|(u, c)| Op::UnsubscribeCourse(u, c)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        #[test]
        fn enrollment_invariants_hold_under_any_op_sequence(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();

            rt.block_on(async {
                let store = MemoryStore::new();
                let mut users = Vec::new();
                for name in ["u0", "u1", "u2"] {
                    users.push(store.create_user(user_draft(name), "hash".to_string()).await.unwrap().id);
                }
                let p1 = store.create_program(program_draft("P1")).await.unwrap();
                let p2 = store.create_program(program_draft("P2")).await.unwrap();
                let programs = [p1.id, p2.id];
                let mut courses = Vec::new();
                for (i, p) in [(0, p1.id), (1, p1.id), (2, p2.id), (3, p2.id)] {
                    courses.push(store.create_course(course_draft(&format!("C{i}"), p)).await.unwrap().id);
                }

                for op in ops {
                    // Individual operations may legitimately fail; the
                    // invariants must hold regardless.
                    let _ = match op {
                        Op::SubscribeProgram(u, p) => store.subscribe_program(users[u], programs[p]).await.map(|_| ()),
                        Op::UnsubscribeProgram(u, p) => store.unsubscribe_program(users[u], programs[p]).await,
                        Op::SubscribeCourse(u, c) => store.subscribe_course(users[u], courses[c]).await,
                        Op::UnsubscribeCourse(u, c) => store.unsubscribe_course(users[u], courses[c]).await,
                    };

                    let inner = store.inner.read().unwrap();
                    // Invariant 2: every course enrollment is backed by a
                    // program enrollment in the owning program.
                    for e in &inner.course_enrollments {
                        let owning = inner.courses[&e.course_id].program_id;
                        let enrolled = inner.program_enrollments.get(&e.user_id).map(|pe| pe.program_id);
                        assert_eq!(enrolled, Some(owning), "dangling course enrollment");
                    }
                    // No duplicate (user, course) rows.
                    for (i, a) in inner.course_enrollments.iter().enumerate() {
                        for b in &inner.course_enrollments[i + 1..] {
                            assert!(!(a.user_id == b.user_id && a.course_id == b.course_id), "duplicate course enrollment");
                        }
                    }
                }
            });
        }
    }
}
