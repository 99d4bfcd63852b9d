//! Pure classification of pulled messages.
//!
//! Maps a message plus the operator's filter criteria and run mode to a
//! [`Classification`]. No I/O here; callers log the decision and act on it.

use std::collections::HashSet;

use crate::pubsub::ReceivedMessage;

/// What to do with the dead-lettered messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Republish matching messages to a target topic, then acknowledge them.
    Reprocess,
    /// Acknowledge messages without republishing, permanently dropping them.
    Purge,
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Copy to the target topic and acknowledge.
    Republish,
    /// Acknowledge without republishing.
    Discard,
    /// Take no action; the message stays pending in the subscription.
    Exclude,
}

/// Optional exact-match predicates. All set predicates must hold for a
/// message to be considered for republish.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub connection_id: Option<String>,
    pub system_event_id: Option<String>,
    pub gundi_id: Option<String>,
    pub source_id: Option<String>,
    pub include_types: HashSet<String>,
    pub exclude_types: HashSet<String>,
}

impl FilterCriteria {
    pub fn is_unfiltered(&self) -> bool {
        self.connection_id.is_none()
            && self.system_event_id.is_none()
            && self.gundi_id.is_none()
            && self.source_id.is_none()
            && self.include_types.is_empty()
            && self.exclude_types.is_empty()
    }
}

/// Classify one message.
///
/// Purge mode discards every pulled message; filter criteria only apply in
/// reprocess mode. There, a message is republished when all set identity
/// predicates match, its event type is not in the exclusion set, and, if an
/// inclusion set is configured, its event type is a member.
pub fn classify(
    message: &ReceivedMessage,
    criteria: &FilterCriteria,
    mode: RunMode,
) -> Classification {
    if mode == RunMode::Purge {
        return Classification::Discard;
    }
    let matches = predicate_matches(criteria.connection_id.as_deref(), message.connection_id())
        && predicate_matches(criteria.system_event_id.as_deref(), message.system_event_id())
        && predicate_matches(criteria.gundi_id.as_deref(), message.gundi_id())
        && predicate_matches(criteria.source_id.as_deref(), message.source_id());
    if !matches {
        return Classification::Exclude;
    }
    if let Some(event_type) = message.event_type() {
        if criteria.exclude_types.contains(event_type) {
            return Classification::Exclude;
        }
    }
    if !criteria.include_types.is_empty() {
        let included = message
            .event_type()
            .is_some_and(|t| criteria.include_types.contains(t));
        if !included {
            return Classification::Exclude;
        }
    }
    Classification::Republish
}

fn predicate_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubsub::mock::{message_with_attributes, message_with_payload};

    fn typed_message(event_type: &str) -> ReceivedMessage {
        message_with_payload(
            "a1",
            &[],
            format!(r#"{{"event_type":"{event_type}"}}"#).as_bytes(),
        )
    }

    #[test]
    fn unfiltered_reprocess_republishes_everything() {
        let msg = message_with_attributes("a1", &[("gundi_id", "g-1")]);
        let result = classify(&msg, &FilterCriteria::default(), RunMode::Reprocess);
        assert_eq!(result, Classification::Republish);
    }

    #[test]
    fn purge_discards_regardless_of_filters() {
        let criteria = FilterCriteria {
            connection_id: Some("other-connection".to_string()),
            gundi_id: Some("other-gundi".to_string()),
            exclude_types: HashSet::from(["A".to_string()]),
            ..Default::default()
        };
        let msg = message_with_payload("a1", &[("gundi_id", "g-1")], br#"{"event_type":"A"}"#);
        assert_eq!(classify(&msg, &criteria, RunMode::Purge), Classification::Discard);
    }

    #[test]
    fn mismatched_identity_predicate_excludes() {
        let msg = message_with_attributes(
            "a1",
            &[
                ("data_provider_id", "c-1"),
                ("gundi_id", "g-1"),
                ("source_id", "s-1"),
            ],
        );
        for criteria in [
            FilterCriteria {
                connection_id: Some("c-2".to_string()),
                ..Default::default()
            },
            FilterCriteria {
                gundi_id: Some("g-2".to_string()),
                ..Default::default()
            },
            FilterCriteria {
                source_id: Some("s-2".to_string()),
                ..Default::default()
            },
            FilterCriteria {
                system_event_id: Some("e-1".to_string()),
                ..Default::default()
            },
        ] {
            assert_eq!(
                classify(&msg, &criteria, RunMode::Reprocess),
                Classification::Exclude
            );
        }
    }

    #[test]
    fn matching_identity_predicates_republish() {
        let msg = message_with_payload(
            "a1",
            &[("data_provider_id", "c-1"), ("gundi_id", "g-1")],
            br#"{"event_id": "e-1", "payload": {"external_source_id": "s-1"}}"#,
        );
        let criteria = FilterCriteria {
            connection_id: Some("c-1".to_string()),
            system_event_id: Some("e-1".to_string()),
            gundi_id: Some("g-1".to_string()),
            source_id: Some("s-1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify(&msg, &criteria, RunMode::Reprocess),
            Classification::Republish
        );
    }

    #[test]
    fn missing_attribute_fails_a_set_predicate() {
        let msg = message_with_attributes("a1", &[]);
        let criteria = FilterCriteria {
            gundi_id: Some("g-1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify(&msg, &criteria, RunMode::Reprocess),
            Classification::Exclude
        );
    }

    #[test]
    fn excluded_event_type_stays_in_queue() {
        let criteria = FilterCriteria {
            exclude_types: HashSet::from(["B".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            classify(&typed_message("B"), &criteria, RunMode::Reprocess),
            Classification::Exclude
        );
        assert_eq!(
            classify(&typed_message("A"), &criteria, RunMode::Reprocess),
            Classification::Republish
        );
    }

    #[test]
    fn inclusion_set_limits_republishing() {
        let criteria = FilterCriteria {
            include_types: HashSet::from(["A".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            classify(&typed_message("A"), &criteria, RunMode::Reprocess),
            Classification::Republish
        );
        assert_eq!(
            classify(&typed_message("C"), &criteria, RunMode::Reprocess),
            Classification::Exclude
        );
        // No event type at all cannot be a member of the inclusion set.
        let untyped = message_with_attributes("a1", &[]);
        assert_eq!(
            classify(&untyped, &criteria, RunMode::Reprocess),
            Classification::Exclude
        );
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let criteria = FilterCriteria {
            include_types: HashSet::from(["A".to_string()]),
            exclude_types: HashSet::from(["A".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            classify(&typed_message("A"), &criteria, RunMode::Reprocess),
            Classification::Exclude
        );
    }

    #[test]
    fn untyped_message_passes_an_exclusion_only_filter() {
        let criteria = FilterCriteria {
            exclude_types: HashSet::from(["B".to_string()]),
            ..Default::default()
        };
        let untyped = message_with_attributes("a1", &[]);
        assert_eq!(
            classify(&untyped, &criteria, RunMode::Reprocess),
            Classification::Republish
        );
    }
}
