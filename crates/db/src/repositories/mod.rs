//! Repository layer.
//!
//! Each repository is a zero-sized struct whose async methods take the
//! pool as their first argument. Multi-row invariants (the single
//! latest-version flag, record supersession) run inside explicit
//! transactions.

pub mod b2b_connection_repo;
pub mod dda_record_repo;
pub mod dda_template_repo;
pub mod organisation_repo;

pub use b2b_connection_repo::B2bConnectionRepo;
pub use dda_record_repo::{AppliedRecord, DdaRecordRepo};
pub use dda_template_repo::{DdaTemplateRepo, TransitionOutcome};
pub use organisation_repo::OrganisationRepo;
