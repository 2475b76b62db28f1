//! DNS-filter counter probe.
//!
//! Reads the Pi-hole FTL database's `counters` table: id 0 is total
//! queries, id 1 is blocked queries. The read is blocking sqlite work and
//! runs on the blocking pool. Any failure (missing database, schema drift)
//! maps to a `ProbeError`; the aggregator substitutes the zero triple.

use pirouter_core::{ProbeError, Result};
use serde::Serialize;

const TOTAL_QUERIES_ID: i64 = 0;
const BLOCKED_QUERIES_ID: i64 = 1;

/// DNS-filter query/block counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DnsFilterCounters {
    pub queries: u64,
    pub blocked: u64,
    /// Blocked percentage, one decimal. 0 when no queries were seen.
    pub blocked_percent: f64,
}

impl DnsFilterCounters {
    pub fn new(queries: u64, blocked: u64) -> Self {
        let blocked_percent = if queries > 0 {
            ((blocked as f64 / queries as f64) * 1000.0).round() / 10.0
        } else {
            0.0
        };
        Self {
            queries,
            blocked,
            blocked_percent,
        }
    }
}

/// Sample query/block counters from the FTL database.
pub async fn sample_dns_counters(db_path: &str) -> Result<DnsFilterCounters> {
    if !std::path::Path::new(db_path).exists() {
        return Err(ProbeError::Unavailable(db_path.to_string()));
    }

    let db_path = db_path.to_string();
    tokio::task::spawn_blocking(move || read_counters(&db_path))
        .await
        .map_err(|e| ProbeError::Parse(format!("counter read task failed: {e}")))?
}

fn read_counters(db_path: &str) -> Result<DnsFilterCounters> {
    let conn = rusqlite::Connection::open_with_flags(
        db_path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
    )
    .map_err(|e| ProbeError::Unavailable(format!("{db_path}: {e}")))?;

    let mut stmt = conn
        .prepare("SELECT id, value FROM counters WHERE id IN (?1, ?2)")
        .map_err(|e| ProbeError::Parse(e.to_string()))?;

    let rows = stmt
        .query_map([TOTAL_QUERIES_ID, BLOCKED_QUERIES_ID], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| ProbeError::Parse(e.to_string()))?;

    let mut queries = 0u64;
    let mut blocked = 0u64;
    for row in rows {
        let (id, value) = row.map_err(|e| ProbeError::Parse(e.to_string()))?;
        let value = value.max(0) as u64;
        match id {
            TOTAL_QUERIES_ID => queries = value,
            BLOCKED_QUERIES_ID => blocked = value,
            _ => {}
        }
    }

    Ok(DnsFilterCounters::new(queries, blocked))
}
