//! contrib-sync
//!
//! Maintenance jobs that keep GitHub contributor data in the Postgres store:
//! - contributor sync: upsert a repository's contributor list
//! - author-id backfill: repair pull requests and issues with no author reference
//!
//! Uses hexagonal (ports & adapters) architecture so both jobs run against
//! in-memory mocks in tests.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

#[cfg(test)]
mod test_utils;
