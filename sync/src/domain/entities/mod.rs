//! Domain entities
//!
//! Plain models for the rows the jobs read and write.

pub mod contributor;
pub mod item;
pub mod repository;

pub use contributor::{Contributor, ContributorId, NewContributor, RepoContributor, BOT_USER_TYPE};
pub use item::{ContributableItem, ItemId, ItemKind};
pub use repository::{Repository, RepositoryId};
