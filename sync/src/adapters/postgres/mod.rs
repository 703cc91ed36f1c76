//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.
//! Table names are resolved at runtime through `TableNames`, so statements are
//! built with sea-query rather than static entities.

pub mod contributor_repo;
pub mod item_repo;
pub mod repository_repo;
pub mod tables;


pub use contributor_repo::PostgresContributorRepository;
pub use item_repo::PostgresItemRepository;
pub use repository_repo::PostgresRepositoryRepository;
pub use tables::TableNames;
