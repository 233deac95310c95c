//! Replay of label events into the set of active workflow labels.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::types::{LabelEvent, LabelEventKind};
use crate::labels::workflow_label;

/// Events in chronological order. The sort is stable, so events sharing a
/// timestamp keep the order the tracker emitted them in.
pub fn sorted_events(events: &[LabelEvent]) -> Vec<&LabelEvent> {
    let mut sorted: Vec<&LabelEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);
    sorted
}

/// Compute the workflow labels active at-or-before `instant`.
///
/// Labels outside the workflow allow-list are skipped. Unlabeling a label
/// that is not active is a no-op. Recomputed on every call.
pub fn active_labels_at(events: &[LabelEvent], instant: DateTime<Utc>) -> BTreeSet<String> {
    sorted_events(events)
        .into_iter()
        .take_while(|e| e.timestamp <= instant)
        .filter_map(|e| workflow_label(&e.label).map(|name| (e.kind, name)))
        .fold(BTreeSet::new(), |mut active, (kind, name)| {
            match kind {
                LabelEventKind::Labeled => {
                    active.insert(name.to_string());
                }
                LabelEventKind::Unlabeled => {
                    active.remove(name);
                }
            }
            active
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{BLOCKED, PLANNING, READY_TO_IMPLEMENT};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_events_yield_empty_set() {
        assert!(active_labels_at(&[], at(100)).is_empty());
    }

    #[test]
    fn test_labeled_then_unlabeled() {
        let events = vec![
            LabelEvent::labeled(PLANNING, at(0)),
            LabelEvent::labeled(READY_TO_IMPLEMENT, at(10)),
            LabelEvent::unlabeled(PLANNING, at(10)),
        ];
        assert_eq!(active_labels_at(&events, at(5)), set(&[PLANNING]));
        assert_eq!(active_labels_at(&events, at(15)), set(&[READY_TO_IMPLEMENT]));
    }

    #[test]
    fn test_instant_is_inclusive() {
        let events = vec![LabelEvent::labeled(BLOCKED, at(10))];
        assert!(active_labels_at(&events, at(9)).is_empty());
        assert_eq!(active_labels_at(&events, at(10)), set(&[BLOCKED]));
    }

    #[test]
    fn test_before_first_event_is_empty() {
        let events = vec![LabelEvent::labeled(PLANNING, at(50))];
        assert!(active_labels_at(&events, at(0)).is_empty());
    }

    #[test]
    fn test_unlabel_absent_label_is_noop() {
        let with_noise = vec![
            LabelEvent::labeled(PLANNING, at(0)),
            LabelEvent::unlabeled(BLOCKED, at(1)),
        ];
        let without = vec![LabelEvent::labeled(PLANNING, at(0))];
        assert_eq!(
            active_labels_at(&with_noise, at(5)),
            active_labels_at(&without, at(5))
        );
    }

    #[test]
    fn test_non_workflow_labels_are_ignored() {
        let events = vec![
            LabelEvent::labeled("bug", at(0)),
            LabelEvent::labeled("enhancement", at(1)),
            LabelEvent::labeled(PLANNING, at(2)),
        ];
        assert_eq!(active_labels_at(&events, at(5)), set(&[PLANNING]));
    }

    #[test]
    fn test_label_names_are_normalised() {
        let events = vec![
            LabelEvent::labeled("Planning", at(0)),
            LabelEvent::unlabeled("PLANNING", at(5)),
        ];
        assert_eq!(active_labels_at(&events, at(1)), set(&[PLANNING]));
        assert!(active_labels_at(&events, at(6)).is_empty());
    }

    #[test]
    fn test_input_order_does_not_matter_for_distinct_timestamps() {
        let ordered = vec![
            LabelEvent::labeled(PLANNING, at(0)),
            LabelEvent::unlabeled(PLANNING, at(10)),
            LabelEvent::labeled(READY_TO_IMPLEMENT, at(20)),
        ];
        let shuffled = vec![
            ordered[2].clone(),
            ordered[0].clone(),
            ordered[1].clone(),
        ];
        for t in [0, 5, 10, 15, 20, 25] {
            assert_eq!(
                active_labels_at(&ordered, at(t)),
                active_labels_at(&shuffled, at(t)),
                "mismatch at t={}",
                t
            );
        }
    }

    #[test]
    fn test_same_timestamp_later_event_wins() {
        let added_last = vec![
            LabelEvent::unlabeled(PLANNING, at(10)),
            LabelEvent::labeled(PLANNING, at(10)),
        ];
        assert_eq!(active_labels_at(&added_last, at(10)), set(&[PLANNING]));

        let removed_last = vec![
            LabelEvent::labeled(PLANNING, at(10)),
            LabelEvent::unlabeled(PLANNING, at(10)),
        ];
        assert!(active_labels_at(&removed_last, at(10)).is_empty());
    }

    #[test]
    fn test_ties_survive_unsorted_input() {
        let events = vec![
            LabelEvent::labeled(PLANNING, at(10)),
            LabelEvent::labeled(BLOCKED, at(0)),
            LabelEvent::unlabeled(PLANNING, at(10)),
        ];
        assert_eq!(active_labels_at(&events, at(10)), set(&[BLOCKED]));
    }

    #[test]
    fn test_replay_is_deterministic() {
        let events = vec![
            LabelEvent::labeled(PLANNING, at(0)),
            LabelEvent::labeled(BLOCKED, at(3)),
            LabelEvent::unlabeled(PLANNING, at(7)),
        ];
        let first = active_labels_at(&events, at(5));
        for _ in 0..10 {
            assert_eq!(active_labels_at(&events, at(5)), first);
        }
    }

    #[test]
    fn test_sorted_events_is_stable() {
        let events = vec![
            LabelEvent::labeled("a", at(5)),
            LabelEvent::labeled("b", at(1)),
            LabelEvent::labeled("c", at(5)),
        ];
        let labels: Vec<&str> = sorted_events(&events)
            .iter()
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }
}
