//! `campushub-enrollment` — program/course enrollment relations and their
//! invariants.
//!
//! The rules enforced here are the heart of the system:
//!
//! 1. a user holds at most one active program enrollment;
//! 2. a course enrollment requires an active enrollment in the course's
//!    owning program;
//! 3. leaving a program removes that user's course enrollments within it.
//!
//! The checks are pure functions so that every store implementation routes
//! through the same logic; atomicity (transactions, critical sections) is
//! the store's responsibility.

pub mod subscription;

pub use subscription::{
    CourseEnrollment, ProgramEnrollment, ensure_can_subscribe_course,
    ensure_can_subscribe_program,
};
