//! Calendar-driven collection triggers
//!
//! Three monthly triggers (one per location, 09:00 UTC on day 1) and one
//! weekly Manchester re-run (Fridays 14:00 UTC). Each firing is independent:
//! it collects the month containing the firing date. The weekly re-run is
//! unconditional and, like every run, inserts again.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ptt_common::time::today;
use ptt_common::{KnownLocation, Period};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use super::{CollectionOrchestrator, CollectionResponse, Sources};

/// A named cron trigger (seconds-resolution, UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub name: &'static str,
    pub cron: &'static str,
    pub location: KnownLocation,
}

pub const TRIGGERS: [Trigger; 4] = [
    Trigger {
        name: "CollectLondon",
        cron: "0 0 9 1 * *",
        location: KnownLocation::London,
    },
    Trigger {
        name: "CollectBirmingham",
        cron: "0 0 9 1 * *",
        location: KnownLocation::Birmingham,
    },
    Trigger {
        name: "CollectManchester",
        cron: "0 0 9 1 * *",
        location: KnownLocation::Manchester,
    },
    Trigger {
        name: "RetryManchesterIfNeeded",
        cron: "0 0 14 * * Fri",
        location: KnownLocation::Manchester,
    },
];

pub struct ScheduleCoordinator {
    orchestrator: Arc<CollectionOrchestrator>,
    sources: Sources,
}

impl ScheduleCoordinator {
    pub fn new(orchestrator: Arc<CollectionOrchestrator>, sources: Sources) -> Self {
        Self {
            orchestrator,
            sources,
        }
    }

    /// Run a trigger for the month containing today (UTC)
    pub async fn fire(&self, trigger: &Trigger) -> CollectionResponse {
        self.fire_on(trigger, today()).await
    }

    /// Run a trigger as if it fired on `date`
    pub async fn fire_on(&self, trigger: &Trigger, date: NaiveDate) -> CollectionResponse {
        let period = Period::containing(date);
        info!(trigger = trigger.name, location = %trigger.location, %period, "Trigger fired");

        let adapter = self.sources.get(trigger.location);
        let response = self.orchestrator.run(adapter.as_ref(), period).await;

        if !response.is_success() {
            warn!(
                trigger = trigger.name,
                status = ?response.status,
                "Scheduled collection did not store any records"
            );
        }
        response
    }

    /// Register every trigger and start the scheduler
    ///
    /// The returned scheduler must be kept alive; `shutdown` stops it.
    pub async fn start(self: Arc<Self>) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .context("creating scheduler")?;

        for trigger in TRIGGERS {
            let coordinator = Arc::clone(&self);
            let job = Job::new_async(trigger.cron, move |_uuid, _lock| {
                let coordinator = Arc::clone(&coordinator);
                Box::pin(async move {
                    coordinator.fire(&trigger).await;
                })
            })
            .with_context(|| format!("creating job {} ({})", trigger.name, trigger.cron))?;

            scheduler
                .add(job)
                .await
                .with_context(|| format!("adding job {}", trigger.name))?;
            info!(trigger = trigger.name, cron = trigger.cron, "Scheduled collection");
        }

        scheduler.start().await.context("starting scheduler")?;
        Ok(scheduler)
    }
}
