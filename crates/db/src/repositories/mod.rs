//! Repository layer over the workflow tables.

pub mod course_repo;
pub mod course_update_repo;

pub use course_repo::CourseRepo;
pub use course_update_repo::CourseUpdateRepo;
