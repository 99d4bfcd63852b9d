//! The outermost retry boundary.
//!
//! Every error from the session, its collaborators, or connection setup is
//! caught here and answered by restarting the session from scratch, forever.
//! This tool runs in an operator's foreground terminal; the operator is the
//! only party who decides to stop (through the continuation gate or an
//! interrupt), so there is no retry cap and no extra backoff beyond the
//! session's own batch pause.

use std::future::Future;
use std::sync::Arc;

use tracing::error;

use crate::drain::interaction::OperatorInteraction;
use crate::drain::session::{run_session, SessionSettings};
use crate::error::Result;
use crate::pubsub::{MessageSink, MessageSource};

/// A connected source plus, in reprocess mode, a sink.
pub type Connection = (Arc<dyn MessageSource>, Option<Arc<dyn MessageSink>>);

/// Run sessions until one terminates cleanly.
///
/// Each attempt gets fresh connections from `connect` and fresh session
/// counters; nothing carries over but the subscription's own pending state.
pub async fn run_with_recovery<F, Fut>(
    settings: &SessionSettings,
    interaction: &dyn OperatorInteraction,
    connect: F,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Connection>>,
{
    loop {
        let attempt = async {
            let (source, sink) = connect().await?;
            run_session(source.as_ref(), sink.as_deref(), interaction, settings).await
        };
        match attempt.await {
            Ok(()) => return Ok(()),
            Err(e) => {
                error!("Session failed: {e}");
                interaction.display_error(&format!("An error occurred: {e}. Restarting.."));
            }
        }
    }
}
