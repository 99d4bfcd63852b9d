//! One pull→classify→act→acknowledge cycle.

use crate::drain::classify::{classify, Classification, FilterCriteria, RunMode};
use crate::drain::interaction::OperatorInteraction;
use crate::error::{Error, Result};
use crate::pubsub::{MessageSink, MessageSource, ReceivedMessage};

/// Per-batch counts, by classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub processed: usize,
    pub republished: usize,
    pub discarded: usize,
    pub excluded: usize,
}

impl BatchOutcome {
    /// Messages removed from the subscription by this batch.
    pub fn acknowledged(&self) -> usize {
        self.republished + self.discarded
    }
}

/// Pull up to `batch_size` messages and act on each according to its
/// classification.
///
/// Republished messages are published as one batch and then acknowledged as
/// one batch; the acknowledgement only happens after the publish call
/// returns, so a publish failure leaves them redeliverable. Purged messages
/// are acknowledged one at a time as they are scanned. Excluded messages
/// are left untouched. Any pull, publish, or acknowledge error propagates
/// to the caller.
pub async fn process_batch(
    source: &dyn MessageSource,
    sink: Option<&dyn MessageSink>,
    interaction: &dyn OperatorInteraction,
    mode: RunMode,
    criteria: &FilterCriteria,
    batch_size: usize,
) -> Result<BatchOutcome> {
    let messages = source.pull(batch_size).await?;
    let mut outcome = BatchOutcome {
        processed: messages.len(),
        ..Default::default()
    };
    let mut republish = Vec::new();
    let mut republish_ack_ids = Vec::new();

    for message in messages {
        interaction.display_progress(&describe(&message));
        match classify(&message, criteria, mode) {
            Classification::Republish => {
                republish.push(message.to_outbound());
                republish_ack_ids.push(message.ack_id);
            }
            Classification::Discard => {
                source.acknowledge(std::slice::from_ref(&message.ack_id)).await?;
                interaction.display_warning(&format!("{} discarded.", describe_short(&message)));
                outcome.discarded += 1;
            }
            Classification::Exclude => {
                interaction.display_info(&format!(
                    "{} excluded. Left in queue.",
                    describe_short(&message)
                ));
                outcome.excluded += 1;
            }
        }
    }

    if !republish.is_empty() {
        let sink = sink.ok_or_else(|| {
            Error::Config("No target topic configured for republishing".to_string())
        })?;
        sink.publish(&republish).await?;
        source.acknowledge(&republish_ack_ids).await?;
        outcome.republished = republish.len();
    }

    Ok(outcome)
}

fn describe(message: &ReceivedMessage) -> String {
    format!(
        "Processing message: {} (gundi_id {}, system_id {}) - Connection {}",
        message.event_type().unwrap_or("unknown"),
        message.gundi_id().unwrap_or("unknown"),
        message.system_event_id().unwrap_or("unknown"),
        message.connection_id().unwrap_or("unknown"),
    )
}

fn describe_short(message: &ReceivedMessage) -> String {
    format!(
        "Message {} (gundi_id {})",
        message.event_type().unwrap_or("unknown"),
        message.gundi_id().unwrap_or("unknown"),
    )
}
