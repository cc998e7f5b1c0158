//! `campushub-catalog` — admin-managed programs and courses.

pub mod course;
pub mod program;

pub use course::{Course, CourseDraft};
pub use program::{Program, ProgramDraft};
