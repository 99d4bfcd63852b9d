//! Draining a dead-letter subscription: classification, batch processing,
//! session orchestration, and the crash-recovery loop around it all.

pub mod batch;
pub mod classify;
pub mod command;
pub mod interaction;
pub mod recovery;
pub mod session;

use std::sync::Arc;

use tracing::info;

pub use command::DrainCommand;

use crate::drain::classify::RunMode;
use crate::drain::interaction::TerminalInteraction;
use crate::drain::recovery::run_with_recovery;
use crate::drain::session::{SessionSettings, BATCH_PAUSE};
use crate::pubsub::{
    subscription_path, topic_path, MessageSink, MessageSource, PublisherClient, PubsubApi,
    SubscriberClient,
};

/// Entry point: validate the command, then run sessions under the
/// crash-recovery loop until the operator stops.
pub async fn run(command: DrainCommand) -> anyhow::Result<()> {
    let mode = command.mode()?;
    let criteria = command.filter_criteria();
    let subscription = subscription_path(&command.project, &command.from_sub);
    let topic = command
        .to_topic
        .as_ref()
        .map(|topic| topic_path(&command.project, topic));

    match mode {
        RunMode::Reprocess => info!(
            "Reprocessing {} into {}",
            subscription,
            topic.as_deref().unwrap_or("(no topic)")
        ),
        RunMode::Purge => info!("Purging {}", subscription),
    }

    let settings = SessionSettings {
        mode,
        criteria,
        subscription: subscription.clone(),
        batch_size: command.batch_size,
        keep_going: command.keep_going,
        pause: BATCH_PAUSE,
    };
    let interaction = TerminalInteraction::new();

    let connect = || {
        let subscription = subscription.clone();
        let topic = topic.clone();
        async move {
            let api = PubsubApi::connect().await?;
            let source: Arc<dyn MessageSource> =
                Arc::new(SubscriberClient::new(api.clone(), subscription));
            let sink: Option<Arc<dyn MessageSink>> =
                topic.map(|topic| Arc::new(PublisherClient::new(api, topic)) as Arc<dyn MessageSink>);
            Ok((source, sink))
        }
    };

    run_with_recovery(&settings, &interaction, connect).await?;
    Ok(())
}
