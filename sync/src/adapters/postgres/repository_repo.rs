//! PostgreSQL adapter for RepositoryRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult};
use uuid::Uuid;

use super::tables::TableNames;
use crate::domain::entities::{Repository, RepositoryId};
use crate::domain::ports::RepositoryRepository;
use crate::error::DomainError;

#[derive(Debug, FromQueryResult)]
struct RepositoryRow {
    id: Uuid,
    owner: String,
    name: String,
    github_id: Option<i64>,
}

impl From<RepositoryRow> for Repository {
    fn from(row: RepositoryRow) -> Self {
        Repository {
            id: RepositoryId(row.id),
            owner: row.owner,
            name: row.name,
            github_id: row.github_id,
        }
    }
}

/// PostgreSQL implementation of RepositoryRepository
pub struct PostgresRepositoryRepository {
    db: DatabaseConnection,
    tables: TableNames,
}

impl PostgresRepositoryRepository {
    pub fn new(db: DatabaseConnection, tables: TableNames) -> Self {
        Self { db, tables }
    }
}

#[async_trait]
impl RepositoryRepository for PostgresRepositoryRepository {
    async fn find_by_id(&self, id: &RepositoryId) -> Result<Option<Repository>, DomainError> {
        let select = Query::select()
            .columns([
                Alias::new("id"),
                Alias::new("owner"),
                Alias::new("name"),
                Alias::new("github_id"),
            ])
            .from(Alias::new(self.tables.repositories.as_str()))
            .and_where(Expr::col(Alias::new("id")).eq(id.0))
            .to_owned();

        let backend = self.db.get_database_backend();
        let result = RepositoryRow::find_by_statement(backend.build(&select))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|row| row.into()))
    }
}
