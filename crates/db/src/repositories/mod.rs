//! Repository layer.
//!
//! Each repository is a zero-sized struct with async methods that take
//! `&mut PgConnection` and the fragment whose tables they address. Table
//! names come from [`FragmentId::table`](research_core::fragment::FragmentId::table);
//! every value is a bound parameter.

pub mod employee_repo;
pub mod group_repo;
pub mod participation_repo;
pub mod project_repo;

pub use employee_repo::EmployeeRepo;
pub use group_repo::GroupRepo;
pub use participation_repo::ParticipationRepo;
pub use project_repo::ProjectRepo;
