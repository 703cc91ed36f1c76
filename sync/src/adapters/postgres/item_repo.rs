//! PostgreSQL adapter for ItemRepository
//!
//! Serves both `pull_requests` and `issues`; `ItemKind` picks the table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{
    Alias, Asterisk, Cond, Expr, Func, Order, Query, SelectStatement, UpdateStatement,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult};
use uuid::Uuid;

use super::tables::TableNames;
use crate::domain::entities::{
    ContributableItem, ContributorId, ItemId, ItemKind, RepositoryId,
};
use crate::domain::ports::{ItemRepository, PageCursor};
use crate::error::DomainError;

#[derive(Debug, FromQueryResult)]
struct ItemRow {
    id: Uuid,
    number: i64,
    repository_id: Uuid,
    author_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for ContributableItem {
    fn from(row: ItemRow) -> Self {
        ContributableItem {
            id: ItemId(row.id),
            number: row.number,
            repository_id: RepositoryId(row.repository_id),
            author_id: row.author_id.map(ContributorId),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

fn col(name: &str) -> Expr {
    Expr::col(Alias::new(name))
}

/// `author_id IS NULL AND repository_id IS NOT NULL AND number IS NOT NULL`
fn missing_author() -> Cond {
    Cond::all()
        .add(col("author_id").is_null())
        .add(col("repository_id").is_not_null())
        .add(col("number").is_not_null())
}

/// `(created_at, id) > (after_created_at, after_id)`
fn after_key(created_at: DateTime<Utc>, id: ItemId) -> Cond {
    Cond::any().add(col("created_at").gt(created_at)).add(
        Cond::all()
            .add(col("created_at").eq(created_at))
            .add(col("id").gt(id.0)),
    )
}

pub(crate) fn missing_author_page(
    table: &str,
    cursor: PageCursor,
    limit: u64,
) -> SelectStatement {
    let mut condition = missing_author();
    if let PageCursor::Keyset {
        after: Some((created_at, id)),
    } = cursor
    {
        condition = condition.add(after_key(created_at, id));
    }

    let mut select = Query::select();
    select
        .columns([
            Alias::new("id"),
            Alias::new("number"),
            Alias::new("repository_id"),
            Alias::new("author_id"),
            Alias::new("created_at"),
        ])
        .from(Alias::new(table))
        .cond_where(condition)
        .order_by(Alias::new("created_at"), Order::Asc)
        .order_by(Alias::new("id"), Order::Asc)
        .limit(limit);
    if let PageCursor::Offset(offset) = cursor {
        select.offset(offset);
    }
    select
}

pub(crate) fn set_author_statement(table: &str, id: &ItemId, author: &ContributorId) -> UpdateStatement {
    Query::update()
        .table(Alias::new(table))
        .value(Alias::new("author_id"), author.0)
        .and_where(col("id").eq(id.0))
        .to_owned()
}

/// PostgreSQL implementation of ItemRepository
pub struct PostgresItemRepository {
    db: DatabaseConnection,
    tables: TableNames,
}

impl PostgresItemRepository {
    pub fn new(db: DatabaseConnection, tables: TableNames) -> Self {
        Self { db, tables }
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn count_missing_author(&self, kind: ItemKind) -> Result<u64, DomainError> {
        let select = Query::select()
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
            .from(Alias::new(self.tables.items(kind)))
            .cond_where(missing_author())
            .to_owned();

        let backend = self.db.get_database_backend();
        let row = CountRow::find_by_statement(backend.build(&select))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }

    async fn find_missing_author(
        &self,
        kind: ItemKind,
        cursor: PageCursor,
        limit: u64,
    ) -> Result<Vec<ContributableItem>, DomainError> {
        let select = missing_author_page(self.tables.items(kind), cursor, limit);

        let backend = self.db.get_database_backend();
        let rows = ItemRow::find_by_statement(backend.build(&select))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn set_author(
        &self,
        kind: ItemKind,
        id: &ItemId,
        author: &ContributorId,
    ) -> Result<u64, DomainError> {
        let update = set_author_statement(self.tables.items(kind), id, author);

        let backend = self.db.get_database_backend();
        let result = self
            .db
            .execute(backend.build(&update))
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
