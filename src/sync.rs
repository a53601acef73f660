//! Push local tables to the hosted backend.
//!
//! Rows go out table by table in foreign-key order as upserts against the
//! backend's REST interface, so pushing the same database twice leaves the
//! remote copy unchanged.

use crate::{
    config::ServiceConfig,
    error::Result,
    storage::{ClubDatabase, TABLES},
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Rows sent per request.
pub const BATCH_SIZE: usize = 500;

/// Headers for an upsert: API key, bearer auth and merge-on-conflict.
pub fn upsert_headers(config: &ServiceConfig) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    h.insert(
        HeaderName::from_static("apikey"),
        HeaderValue::from_str(&config.api_key)?,
    );
    h.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.api_key))?,
    );
    h.insert(
        HeaderName::from_static("prefer"),
        HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
    );
    Ok(h)
}

/// Upsert `rows` into `table`, resolving duplicates on `on_conflict`.
///
/// Sends nothing for an empty slice. Returns the number of rows sent.
pub async fn upsert_rows(
    client: &Client,
    config: &ServiceConfig,
    table: &str,
    on_conflict: &str,
    rows: &[Value],
) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    let url = format!("{}/rest/v1/{}", config.url, table);
    let mut sent = 0;
    for batch in rows.chunks(BATCH_SIZE) {
        debug!(table, rows = batch.len(), "Sending batch");
        client
            .post(&url)
            .headers(upsert_headers(config)?)
            .query(&[("on_conflict", on_conflict)])
            .json(batch)
            .send()
            .await?
            .error_for_status()?;
        sent += batch.len();
    }
    Ok(sent)
}

/// Rows pushed (or, for a dry run, that would be pushed) per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub tables: Vec<TableSync>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSync {
    pub table: String,
    pub rows: usize,
}

impl SyncReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Row counts for every table without touching the network.
pub fn plan(db: &ClubDatabase) -> Result<SyncReport> {
    let tables = db
        .table_counts()?
        .into_iter()
        .map(|(table, rows)| TableSync {
            table: table.to_string(),
            rows,
        })
        .collect();
    Ok(SyncReport {
        dry_run: true,
        tables,
    })
}

/// Push every table in dependency order. Stops at the first failed request.
pub async fn push_all(
    client: &Client,
    config: &ServiceConfig,
    db: &ClubDatabase,
) -> Result<SyncReport> {
    let mut tables = Vec::with_capacity(TABLES.len());
    for (table, on_conflict) in TABLES {
        let rows = db.export_table(table)?;
        let sent = upsert_rows(client, config, table, on_conflict, &rows).await?;
        info!(table = *table, rows = sent, "Pushed table");
        tables.push(TableSync {
            table: table.to_string(),
            rows: sent,
        });
    }

    let report = SyncReport {
        dry_run: false,
        tables,
    };
    info!(total = report.total_rows(), url = %config.url, "Sync complete");
    Ok(report)
}
