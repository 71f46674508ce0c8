use anyhow::Result;
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::db::{
    helpers::{format_datetime, parse_datetime},
    models::Interval,
    Database,
};

fn row_to_interval(row: &Row) -> Result<Interval> {
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;

    Ok(Interval {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_datetime(&ended_at, "ended_at")?,
    })
}

fn count_active(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT count(*) FROM active_interval", [], |row| row.get(0))
}

fn read_active(conn: &Connection) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT started_at FROM active_interval LIMIT 1",
        [],
        |row| row.get(0),
    )
    .optional()
}

fn insert_active(tx: &Transaction<'_>, started_at: &str) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO active_interval (started_at) VALUES (?1)",
        params![started_at],
    )?;
    Ok(())
}

fn delete_active(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM active_interval", [])?;
    Ok(())
}

fn append_interval(
    tx: &Transaction<'_>,
    id: &str,
    started_at: &str,
    ended_at: &str,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO intervals (id, started_at, ended_at) VALUES (?1, ?2, ?3)",
        params![id, started_at, ended_at],
    )?;
    Ok(())
}

impl Database {
    /// Opens a new active interval unless one already exists. The check and
    /// the insert run in one transaction on the worker thread, so concurrent
    /// callers cannot both see an empty slot.
    pub async fn open_interval(&self, started_at: DateTime<Utc>) -> Result<bool> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            if count_active(&tx)? > 0 {
                return Ok(false);
            }
            insert_active(&tx, &format_datetime(&started_at))?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    /// Closes the active interval: appends the closed row and clears the
    /// slot in one transaction. Returns `None` when nothing was open. On any
    /// failure the transaction rolls back and both tables keep their
    /// pre-call state.
    pub async fn close_interval(
        &self,
        id: String,
        ended_at: DateTime<Utc>,
    ) -> Result<Option<Interval>> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let Some(raw_started) = read_active(&tx)? else {
                return Ok(None);
            };
            let started_at = parse_datetime(&raw_started, "started_at")?;
            // Carry the stored text through unchanged; the value at rest is
            // never re-encoded.
            append_interval(&tx, &id, &raw_started, &format_datetime(&ended_at))?;
            delete_active(&tx)?;
            tx.commit()?;
            Ok(Some(Interval {
                id,
                started_at,
                ended_at,
            }))
        })
        .await
    }

    /// All closed intervals in the order they were closed. A malformed
    /// stored timestamp fails the whole listing.
    pub async fn list_intervals(&self) -> Result<Vec<Interval>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, ended_at
                 FROM intervals
                 ORDER BY rowid",
            )?;

            let mut rows = stmt.query([])?;
            let mut intervals = Vec::new();
            while let Some(row) = rows.next()? {
                intervals.push(row_to_interval(row)?);
            }

            Ok(intervals)
        })
        .await
    }

    /// Start of the active interval, if any. Absence is a normal outcome; an
    /// unreadable slot value is logged and also reported as absent.
    pub async fn active_started_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.execute(|conn| {
            let Some(raw) = read_active(conn)? else {
                return Ok(None);
            };
            match parse_datetime(&raw, "started_at") {
                Ok(started_at) => Ok(Some(started_at)),
                Err(err) => {
                    warn!("Ignoring unreadable active interval: {err:#}");
                    Ok(None)
                }
            }
        })
        .await
    }

    pub async fn count_active(&self) -> Result<i64> {
        self.execute(|conn| Ok(count_active(conn)?)).await
    }
}
