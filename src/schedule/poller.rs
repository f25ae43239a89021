// src/schedule/poller.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::RuntimeEvent;
use crate::errors::PacekeeperError;

use super::SpeedSource;

/// Spawn the background task that turns the schedule into speed readings.
///
/// The first reading is produced immediately, then one every `every`. The
/// same value is sent on every tick; deciding whether anything changed is
/// the supervisor's job.
///
/// A schedule error is sent as [`RuntimeEvent::ScheduleFailed`] and ends
/// polling: without a readable schedule there is no desired state to report.
pub fn spawn_schedule_poller(
    source: Arc<dyn SpeedSource>,
    every: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval = ?every, "schedule poller started");

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let event = match source.speed_at(Local::now().naive_local()) {
                Ok(speed) => RuntimeEvent::SpeedReading(speed),
                Err(err) => {
                    error!(error = %err, "failed to evaluate schedule");
                    let reason = match err {
                        PacekeeperError::ScheduleError(msg) => msg,
                        other => other.to_string(),
                    };
                    RuntimeEvent::ScheduleFailed { reason }
                }
            };
            let fatal = matches!(event, RuntimeEvent::ScheduleFailed { .. });

            if runtime_tx.send(event).await.is_err() {
                debug!("runtime event channel closed; stopping schedule poller");
                break;
            }
            if fatal {
                break;
            }
        }
    })
}
