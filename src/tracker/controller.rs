use anyhow::Result;
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::db::{ActiveInterval, Database, Interval};

use super::{StartOutcome, StopOutcome};

/// Drives the interval state machine over the store. The store is the single
/// source of truth; no state is mirrored in memory, so the single-active
/// invariant lives in exactly one place.
#[derive(Clone)]
pub struct Tracker {
    db: Database,
}

impl Tracker {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn start_interval(&self) -> Result<StartOutcome> {
        let started_at = Utc::now();
        if self.db.open_interval(started_at).await? {
            info!("Started interval at {started_at}");
            Ok(StartOutcome::Created { started_at })
        } else {
            Ok(StartOutcome::AlreadyRunning)
        }
    }

    pub async fn stop_interval(&self) -> Result<StopOutcome> {
        let id = Uuid::new_v4().to_string();
        let ended_at = Utc::now();
        match self.db.close_interval(id, ended_at).await? {
            Some(interval) => {
                info!("Closed interval {}", interval.id);
                Ok(StopOutcome::Closed { interval })
            }
            None => Ok(StopOutcome::NoActiveInterval),
        }
    }

    pub async fn list_intervals(&self) -> Result<Vec<Interval>> {
        self.db.list_intervals().await
    }

    pub async fn active_interval(&self) -> Result<Option<ActiveInterval>> {
        let started_at = self.db.active_started_at().await?;
        Ok(started_at.map(|started_at| ActiveInterval { started_at }))
    }
}
