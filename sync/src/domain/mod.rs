//! Domain layer
//!
//! Contains the core data model with no external dependencies.
//! - `entities`: Domain models for contributors, repositories and items
//! - `ports`: Trait definitions for the data store and the GitHub API

pub mod entities;
pub mod ports;
