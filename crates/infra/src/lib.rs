//! `campushub-infra` — storage implementations behind the store traits.

pub mod store;

pub use store::{
    CatalogStore, EnrollmentStore, MemoryStore, MessageStore, PostgresStore, Store, StoreError,
    StudentWithEnrollment, UserStore,
};
