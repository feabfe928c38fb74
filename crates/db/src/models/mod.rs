//! Domain model structs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row. Create DTOs live in `silhouette_core`.

pub mod item;
