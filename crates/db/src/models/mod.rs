//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - For updates, an all-`Option` overlay DTO where `None` means
//!   "inherit from the base course at resolution time"

pub mod course;
pub mod course_update;
