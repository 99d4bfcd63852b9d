//! Session orchestration: repeated batches, progress reporting, and the
//! continuation gate.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::drain::batch::{process_batch, BatchOutcome};
use crate::drain::classify::{FilterCriteria, RunMode};
use crate::drain::interaction::OperatorInteraction;
use crate::error::Result;
use crate::pubsub::{MessageSink, MessageSource};

/// Pause between batches, to stay under the API's pull rate limits.
pub const BATCH_PAUSE: Duration = Duration::from_secs(2);

/// Everything a session needs to know, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub mode: RunMode,
    pub criteria: FilterCriteria,
    /// Fully qualified subscription path, for operator output.
    pub subscription: String,
    pub batch_size: usize,
    /// Suppress the empty-batch continuation prompt.
    pub keep_going: bool,
    pub pause: Duration,
}

/// Cumulative totals for one session attempt. Not persisted; a restarted
/// session starts over from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub processed: usize,
    pub acknowledged: usize,
}

impl SessionCounters {
    pub fn accumulate(&mut self, outcome: &BatchOutcome) {
        self.processed += outcome.processed;
        self.acknowledged += outcome.acknowledged();
    }
}

/// Run batches until the operator declines to continue.
///
/// A purge session first asks for confirmation, before anything is pulled;
/// declining ends the session cleanly. After each batch the cumulative and
/// per-batch totals are reported. When a batch acknowledged nothing and the
/// keep-going flag is unset, the operator is asked whether to continue; a
/// negative answer ends the session without the rate-limit pause. Errors
/// from the source or sink propagate to the caller untouched.
pub async fn run_session(
    source: &dyn MessageSource,
    sink: Option<&dyn MessageSink>,
    interaction: &dyn OperatorInteraction,
    settings: &SessionSettings,
) -> Result<()> {
    if settings.mode == RunMode::Purge {
        let proceed = interaction
            .confirm("Using --purge may cause data loss, are you sure?", false)
            .await?;
        if !proceed {
            interaction.display_info("Exiting..");
            return Ok(());
        }
    }

    let mut counters = SessionCounters::default();
    loop {
        interaction.display_progress(&format!(
            "Pulling messages from {}...",
            settings.subscription
        ));
        let outcome = process_batch(
            source,
            sink,
            interaction,
            settings.mode,
            &settings.criteria,
            settings.batch_size,
        )
        .await?;
        counters.accumulate(&outcome);
        debug!(
            "Batch complete: {} processed, {} acknowledged",
            outcome.processed,
            outcome.acknowledged()
        );
        interaction.display_info(&format!(
            "Total acknowledged/processed: ({}/{}). This batch: ({}/{})",
            counters.acknowledged,
            counters.processed,
            outcome.acknowledged(),
            outcome.processed
        ));

        if outcome.acknowledged() == 0 && !settings.keep_going {
            let go_on = interaction.confirm("Continue?", true).await?;
            if !go_on {
                interaction.display_info("Exiting..");
                return Ok(());
            }
        }
        interaction.display_progress("Continuing..");
        sleep(settings.pause).await;
    }
}
