//! Command-line surface of a drain run.

use clap::Args;

use crate::drain::classify::{FilterCriteria, RunMode};
use crate::error::{Error, Result};

/// Reprocess or purge dead-lettered events stuck in a subscription.
#[derive(Debug, Args, Clone)]
pub struct DrainCommand {
    /// Subscription (id) to pull messages from
    #[arg(long)]
    pub from_sub: String,

    /// Topic (id) to publish messages to
    #[arg(long)]
    pub to_topic: Option<String>,

    /// GCP project id owning the subscription and topic
    #[arg(long)]
    pub project: String,

    /// Keep processing without prompting when a batch acknowledges nothing
    #[arg(long = "continue")]
    pub keep_going: bool,

    /// Republish matching messages to the target topic
    #[arg(long)]
    pub reprocess: bool,

    /// Discard pulled messages without republishing them
    #[arg(long)]
    pub purge: bool,

    /// Message types to include in reprocessing (repeatable)
    #[arg(long)]
    pub msg_type: Vec<String>,

    /// Message types to exclude from reprocessing (repeatable)
    #[arg(long)]
    pub msg_type_exclude: Vec<String>,

    /// Connection ID to filter messages by
    #[arg(long)]
    pub connection: Option<String>,

    /// System event ID to filter messages by
    #[arg(long)]
    pub system_id: Option<String>,

    /// Gundi ID to filter messages by
    #[arg(long)]
    pub gundi_id: Option<String>,

    /// Source ID to filter messages by
    #[arg(long)]
    pub source_id: Option<String>,

    /// Number of messages to pull per batch iteration
    #[arg(long, default_value = "100")]
    pub batch_size: usize,
}

impl DrainCommand {
    /// Resolve the mode flags. Rejected combinations surface before any
    /// connection is attempted.
    pub fn mode(&self) -> Result<RunMode> {
        match (self.reprocess, self.purge) {
            (true, true) => Err(Error::Config(
                "Cannot use --reprocess and --purge together".to_string(),
            )),
            (false, false) => Err(Error::Config(
                "Must use either --reprocess or --purge".to_string(),
            )),
            (true, false) if self.to_topic.is_none() => Err(Error::Config(
                "Must provide a target topic with --reprocess".to_string(),
            )),
            (true, false) => Ok(RunMode::Reprocess),
            (false, true) => Ok(RunMode::Purge),
        }
    }

    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            connection_id: self.connection.clone(),
            system_event_id: self.system_id.clone(),
            gundi_id: self.gundi_id.clone(),
            source_id: self.source_id.clone(),
            include_types: self.msg_type.iter().cloned().collect(),
            exclude_types: self.msg_type_exclude.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> DrainCommand {
        DrainCommand {
            from_sub: "dlq-sub".to_string(),
            to_topic: None,
            project: "test-project".to_string(),
            keep_going: false,
            reprocess: false,
            purge: false,
            msg_type: Vec::new(),
            msg_type_exclude: Vec::new(),
            connection: None,
            system_id: None,
            gundi_id: None,
            source_id: None,
            batch_size: 100,
        }
    }

    #[test]
    fn both_mode_flags_are_rejected() {
        let cmd = DrainCommand {
            reprocess: true,
            purge: true,
            ..command()
        };
        let err = cmd.mode().unwrap_err();
        assert!(err.to_string().contains("together"));
    }

    #[test]
    fn missing_mode_flag_is_rejected() {
        let err = command().mode().unwrap_err();
        assert!(err.to_string().contains("either --reprocess or --purge"));
    }

    #[test]
    fn reprocess_requires_a_target_topic() {
        let cmd = DrainCommand {
            reprocess: true,
            ..command()
        };
        let err = cmd.mode().unwrap_err();
        assert!(err.to_string().contains("target topic"));

        let cmd = DrainCommand {
            reprocess: true,
            to_topic: Some("events".to_string()),
            ..command()
        };
        assert_eq!(cmd.mode().unwrap(), RunMode::Reprocess);
    }

    #[test]
    fn purge_needs_no_topic() {
        let cmd = DrainCommand {
            purge: true,
            ..command()
        };
        assert_eq!(cmd.mode().unwrap(), RunMode::Purge);
    }

    #[test]
    fn filters_map_into_criteria() {
        let cmd = DrainCommand {
            connection: Some("c-1".to_string()),
            gundi_id: Some("g-1".to_string()),
            msg_type: vec!["A".to_string(), "B".to_string(), "A".to_string()],
            msg_type_exclude: vec!["C".to_string()],
            ..command()
        };
        let criteria = cmd.filter_criteria();
        assert_eq!(criteria.connection_id.as_deref(), Some("c-1"));
        assert_eq!(criteria.gundi_id.as_deref(), Some("g-1"));
        assert_eq!(criteria.include_types.len(), 2);
        assert!(criteria.exclude_types.contains("C"));
        assert!(criteria.system_event_id.is_none());
        assert!(criteria.source_id.is_none());
    }

    #[test]
    fn no_filters_means_unfiltered() {
        assert!(command().filter_criteria().is_unfiltered());
    }
}
