//! PostgreSQL adapter for ContributorRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, InsertStatement, OnConflict, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult};
use uuid::Uuid;

use super::tables::TableNames;
use crate::domain::entities::{Contributor, ContributorId, NewContributor, RepoContributor};
use crate::domain::ports::ContributorRepository;
use crate::error::DomainError;

/// Columns written by the contributor sync, in value order
const REPO_CONTRIBUTOR_COLUMNS: [&str; 9] = [
    "github_id",
    "username",
    "avatar_url",
    "profile_url",
    "contributions",
    "repository",
    "user_type",
    "is_bot",
    "last_updated_at",
];

/// Sync conflict key
const REPO_CONTRIBUTOR_KEY: [&str; 2] = ["github_id", "repository"];

/// Columns written when the backfill creates a contributor, in value order
const NEW_CONTRIBUTOR_COLUMNS: [&str; 15] = [
    "github_id",
    "username",
    "display_name",
    "avatar_url",
    "profile_url",
    "user_type",
    "is_bot",
    "company",
    "location",
    "bio",
    "public_repos",
    "followers",
    "following",
    "first_seen_at",
    "last_updated_at",
];

const CONTRIBUTOR_SELECT_COLUMNS: [&str; 9] = [
    "id",
    "github_id",
    "username",
    "display_name",
    "avatar_url",
    "profile_url",
    "is_bot",
    "first_seen_at",
    "last_updated_at",
];

fn aliases(columns: &[&str]) -> Vec<Alias> {
    columns.iter().map(|c| Alias::new(*c)).collect()
}

#[derive(Debug, FromQueryResult)]
struct ContributorRow {
    id: Uuid,
    github_id: i64,
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    profile_url: Option<String>,
    is_bot: Option<bool>,
    first_seen_at: Option<DateTime<Utc>>,
    last_updated_at: Option<DateTime<Utc>>,
}

impl From<ContributorRow> for Contributor {
    fn from(row: ContributorRow) -> Self {
        Contributor {
            id: ContributorId(row.id),
            github_id: row.github_id,
            username: row.username,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            profile_url: row.profile_url,
            is_bot: row.is_bot.unwrap_or(false),
            first_seen_at: row.first_seen_at,
            last_updated_at: row.last_updated_at,
        }
    }
}

fn repo_contributor_values(row: &RepoContributor) -> [SimpleExpr; 9] {
    [
        row.github_id.into(),
        row.username.clone().into(),
        row.avatar_url.clone().into(),
        row.profile_url.clone().into(),
        row.contributions.into(),
        row.repository.clone().into(),
        row.user_type.clone().into(),
        row.is_bot.into(),
        row.last_updated_at.into(),
    ]
}

fn new_contributor_values(c: &NewContributor) -> [SimpleExpr; 15] {
    [
        c.github_id.into(),
        c.username.clone().into(),
        c.display_name.clone().into(),
        c.avatar_url.clone().into(),
        c.profile_url.clone().into(),
        c.user_type.clone().into(),
        c.is_bot.into(),
        c.company.clone().into(),
        c.location.clone().into(),
        c.bio.clone().into(),
        c.public_repos.into(),
        c.followers.into(),
        c.following.into(),
        c.first_seen_at.into(),
        c.last_updated_at.into(),
    ]
}

/// Batched insert that overwrites every non-key column on `(github_id, repository)` conflicts
pub(crate) fn upsert_repo_contributors_statement(
    table: &str,
    rows: &[RepoContributor],
) -> Result<InsertStatement, DomainError> {
    let update_columns: Vec<Alias> = REPO_CONTRIBUTOR_COLUMNS
        .iter()
        .filter(|c| !REPO_CONTRIBUTOR_KEY.contains(*c))
        .map(|c| Alias::new(*c))
        .collect();

    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(table))
        .columns(aliases(&REPO_CONTRIBUTOR_COLUMNS));
    for row in rows {
        insert
            .values(repo_contributor_values(row))
            .map_err(|e| DomainError::Query(e.to_string()))?;
    }
    insert.on_conflict(
        OnConflict::columns(aliases(&REPO_CONTRIBUTOR_KEY))
            .update_columns(update_columns)
            .to_owned(),
    );

    Ok(insert)
}

pub(crate) fn create_contributor_statement(
    table: &str,
    contributor: &NewContributor,
) -> Result<InsertStatement, DomainError> {
    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(table))
        .columns(aliases(&NEW_CONTRIBUTOR_COLUMNS))
        .values(new_contributor_values(contributor))
        .map_err(|e| DomainError::Query(e.to_string()))?;
    insert.returning_col(Alias::new("id"));

    Ok(insert)
}

/// PostgreSQL implementation of ContributorRepository
pub struct PostgresContributorRepository {
    db: DatabaseConnection,
    tables: TableNames,
}

impl PostgresContributorRepository {
    pub fn new(db: DatabaseConnection, tables: TableNames) -> Self {
        Self { db, tables }
    }

    fn table(&self) -> Alias {
        Alias::new(self.tables.contributors.as_str())
    }
}

#[async_trait]
impl ContributorRepository for PostgresContributorRepository {
    async fn upsert_repo_contributors(
        &self,
        rows: &[RepoContributor],
    ) -> Result<u64, DomainError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let insert = upsert_repo_contributors_statement(&self.tables.contributors, rows)?;

        let backend = self.db.get_database_backend();
        let result = self
            .db
            .execute(backend.build(&insert))
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn find_by_github_id(&self, github_id: i64) -> Result<Option<Contributor>, DomainError> {
        let select = Query::select()
            .columns(aliases(&CONTRIBUTOR_SELECT_COLUMNS))
            .from(self.table())
            .and_where(Expr::col(Alias::new("github_id")).eq(github_id))
            .limit(1)
            .to_owned();

        let backend = self.db.get_database_backend();
        let result = ContributorRow::find_by_statement(backend.build(&select))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|row| row.into()))
    }

    async fn create(&self, contributor: &NewContributor) -> Result<ContributorId, DomainError> {
        let insert = create_contributor_statement(&self.tables.contributors, contributor)?;

        let backend = self.db.get_database_backend();
        let row = self
            .db
            .query_one(backend.build(&insert))
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| {
                DomainError::Database(format!(
                    "insert into {} returned no id for github user {}",
                    self.tables.contributors, contributor.github_id
                ))
            })?;

        let id: Uuid = row
            .try_get("", "id")
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(ContributorId(id))
    }
}
