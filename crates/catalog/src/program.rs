use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use campushub_core::{DomainError, DomainResult, ProgramId};

/// An academic program: the unit students enroll in, owning zero or more
/// courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub program_code: String,
    pub name: String,
    pub description: String,
    pub term: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Fee in the smallest currency unit.
    pub fees: i64,
}

/// Create/update payload for a program.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgramDraft {
    pub program_code: String,
    pub name: String,
    pub description: String,
    pub term: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fees: i64,
}

impl ProgramDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.program_code.trim().is_empty() {
            return Err(DomainError::validation("program code is required"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("program name is required"));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::validation("end date precedes start date"));
        }
        if self.fees < 0 {
            return Err(DomainError::validation("fees must not be negative"));
        }
        Ok(())
    }

    /// Materialize the draft under a fresh identifier.
    pub fn into_program(self, id: ProgramId) -> Program {
        Program {
            id,
            program_code: self.program_code,
            name: self.name,
            description: self.description,
            term: self.term,
            start_date: self.start_date,
            end_date: self.end_date,
            fees: self.fees,
        }
    }
}
