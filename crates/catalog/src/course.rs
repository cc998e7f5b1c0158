use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use campushub_core::{CourseId, DomainError, DomainResult, ProgramId};

/// A unit of study owned by exactly one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub course_code: String,
    pub name: String,
    pub description: String,
    pub term: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub program_id: ProgramId,
}

/// Create/update payload for a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseDraft {
    pub course_code: String,
    pub name: String,
    pub description: String,
    pub term: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub program_id: ProgramId,
}

impl CourseDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.course_code.trim().is_empty() {
            return Err(DomainError::validation("course code is required"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("course name is required"));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::validation("end date precedes start date"));
        }
        Ok(())
    }

    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            course_code: self.course_code,
            name: self.name,
            description: self.description,
            term: self.term,
            start_date: self.start_date,
            end_date: self.end_date,
            program_id: self.program_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CourseDraft {
        CourseDraft {
            course_code: "CS-201".to_string(),
            name: "Data Structures".to_string(),
            description: "Lists, trees, and maps".to_string(),
            term: "Fall".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            program_id: ProgramId::new(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut d = draft();
        d.name = String::new();
        assert!(d.validate().is_err());
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let mut d = draft();
        d.end_date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert!(d.validate().is_err());
    }
}
