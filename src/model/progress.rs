//! Per-step progress and the progress merger
//!
//! The backend reports progress twice: a basic map of step index to a
//! completion flag, and a detailed map of step index to assessment data.
//! Both are normalized into a single [`ProgressMap`] keyed by step index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::parse::{lenient, lenient_text};

/// Assessment data recorded when a step is completed.
///
/// Every field decodes on its own; a value of the wrong type falls back to
/// its default instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedProgress {
    #[serde(default, deserialize_with = "lenient")]
    pub completed: bool,
    /// Learner-reported difficulty, 1-5
    #[serde(default, deserialize_with = "lenient")]
    pub difficulty_rating: Option<u8>,
    /// Self-assessed comprehension, 0-100
    #[serde(default, deserialize_with = "lenient")]
    pub comprehension_score: Option<f64>,
    /// Minutes spent on the step
    #[serde(default, deserialize_with = "lenient")]
    pub time_spent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub completed_at: Option<String>,
}

/// Completion record for one step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEntry {
    /// Bare completion flag from the basic progress map
    Simple { completed: bool },
    /// Rich assessment record
    Detailed(DetailedProgress),
}

impl ProgressEntry {
    pub fn is_completed(&self) -> bool {
        match self {
            ProgressEntry::Simple { completed } => *completed,
            ProgressEntry::Detailed(detail) => detail.completed,
        }
    }

    /// Recorded comprehension score; bare flags count as 0
    pub fn comprehension_score(&self) -> f64 {
        match self {
            ProgressEntry::Simple { .. } => 0.0,
            ProgressEntry::Detailed(detail) => detail.comprehension_score.unwrap_or(0.0),
        }
    }

    pub fn details(&self) -> Option<&DetailedProgress> {
        match self {
            ProgressEntry::Simple { .. } => None,
            ProgressEntry::Detailed(detail) => Some(detail),
        }
    }

    /// Normalize a raw server value. Every value yields an entry, so a key
    /// present on the server is never lost here.
    fn from_raw(index: usize, value: Value) -> Self {
        match value {
            Value::Bool(completed) => ProgressEntry::Simple { completed },
            Value::Object(_) => match serde_json::from_value(value) {
                Ok(detail) => ProgressEntry::Detailed(detail),
                Err(e) => {
                    tracing::warn!(step_index = index, error = %e, "Malformed progress details");
                    ProgressEntry::Detailed(DetailedProgress::default())
                }
            },
            Value::Number(n) => ProgressEntry::Simple {
                completed: n.as_f64().map(|v| v != 0.0).unwrap_or(false),
            },
            Value::String(s) => ProgressEntry::Simple {
                completed: s.trim().eq_ignore_ascii_case("true"),
            },
            Value::Null | Value::Array(_) => ProgressEntry::Simple { completed: false },
        }
    }
}

/// Step index to progress entry. Iteration is in ascending step order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProgressMap(BTreeMap<usize, ProgressEntry>);

impl ProgressMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, step_index: usize) -> Option<&ProgressEntry> {
        self.0.get(&step_index)
    }

    pub fn insert(&mut self, step_index: usize, entry: ProgressEntry) -> Option<ProgressEntry> {
        self.0.insert(step_index, entry)
    }

    pub fn is_completed(&self, step_index: usize) -> bool {
        self.get(step_index).map(ProgressEntry::is_completed).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ProgressEntry)> {
        self.0.iter().map(|(index, entry)| (*index, entry))
    }

    pub fn completed(&self) -> impl Iterator<Item = (usize, &ProgressEntry)> {
        self.iter().filter(|(_, entry)| entry.is_completed())
    }

    pub fn completed_count(&self) -> usize {
        self.completed().count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adopt a freshly fetched map without losing known completions.
    ///
    /// Fresh entries replace local ones, except that a locally completed
    /// step is never downgraded, and local assessment data is kept when the
    /// server only reports a bare flag for it.
    pub fn reconcile(&mut self, fresh: ProgressMap) {
        for (index, entry) in fresh.0 {
            let keep_local = match self.0.get(&index) {
                Some(local) if local.is_completed() => {
                    !entry.is_completed()
                        || matches!(
                            (local, &entry),
                            (ProgressEntry::Detailed(_), ProgressEntry::Simple { .. })
                        )
                }
                _ => false,
            };
            if keep_local {
                tracing::debug!(step_index = index, "Keeping local progress over stale server entry");
                continue;
            }
            self.0.insert(index, entry);
        }
    }
}

impl FromIterator<(usize, ProgressEntry)> for ProgressMap {
    fn from_iter<I: IntoIterator<Item = (usize, ProgressEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for ProgressMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

impl ProgressMap {
    /// Normalize a raw JSON object keyed by step index
    fn from_raw(raw: Map<String, Value>) -> Self {
        let mut map = ProgressMap::new();
        for (key, value) in raw {
            let Ok(index) = key.trim().parse::<usize>() else {
                tracing::warn!(key = %key, "Ignoring progress entry with non-numeric step key");
                continue;
            };
            map.insert(index, ProgressEntry::from_raw(index, value));
        }
        map
    }
}

/// Merge the basic and detailed progress maps.
///
/// Right-biased over the union of keys: a detailed entry always wins and is
/// marked completed, since the server only records details for completed
/// steps. Keys only in `basic` keep their value.
pub fn merge_progress(basic: &ProgressMap, detailed: &ProgressMap) -> ProgressMap {
    let mut merged = basic.clone();
    for (index, entry) in detailed.iter() {
        let mut detail = match entry {
            ProgressEntry::Detailed(detail) => detail.clone(),
            ProgressEntry::Simple { .. } => DetailedProgress::default(),
        };
        detail.completed = true;
        merged.insert(index, ProgressEntry::Detailed(detail));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ProgressMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalizes_flags_and_objects() {
        let map = parse(json!({
            "0": true,
            "1": false,
            "2": {"completed": true, "comprehension_score": 85, "difficulty_rating": 4},
            "x": true
        }));

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(0), Some(&ProgressEntry::Simple { completed: true }));
        assert!(!map.is_completed(1));
        assert_eq!(map.get(2).unwrap().comprehension_score(), 85.0);
        assert_eq!(map.completed_count(), 2);
    }

    #[test]
    fn test_merge_detailed_wins_and_completes() {
        let basic = parse(json!({"0": true, "1": false, "2": false}));
        let detailed = parse(json!({
            "1": {"completed": false, "comprehension_score": 40, "notes": "hard"},
            "3": {"comprehension_score": 90}
        }));

        let merged = merge_progress(&basic, &detailed);

        // Key only in basic is untouched
        assert_eq!(merged.get(0), basic.get(0));
        assert_eq!(merged.get(2), basic.get(2));

        // Keys in detailed are completed and keep every detailed field
        let one = merged.get(1).unwrap().details().unwrap();
        assert!(one.completed);
        assert_eq!(one.comprehension_score, Some(40.0));
        assert_eq!(one.notes.as_deref(), Some("hard"));
        assert!(merged.is_completed(3));
    }

    #[test]
    fn test_merge_never_completes_step_incomplete_in_both() {
        let basic = parse(json!({"4": false}));
        let merged = merge_progress(&basic, &ProgressMap::new());
        assert!(!merged.is_completed(4));
        assert!(!merged.is_completed(5));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let basic = parse(json!({"0": true, "1": false}));
        let detailed = parse(json!({"1": {"comprehension_score": 55, "time_spent": 20}}));

        let once = merge_progress(&basic, &detailed);
        assert_eq!(merge_progress(&once, &detailed), once);
        assert_eq!(merge_progress(&once, &ProgressMap::new()), once);
        assert_eq!(merge_progress(&basic, &detailed), once);
    }

    #[test]
    fn test_reconcile_keeps_known_completion() {
        let mut local = parse(json!({"0": true, "1": false}));
        local.insert(
            2,
            ProgressEntry::Detailed(DetailedProgress {
                completed: true,
                comprehension_score: Some(85.0),
                ..Default::default()
            }),
        );

        let fresh = parse(json!({"0": false, "1": true, "2": true, "3": true}));
        local.reconcile(fresh);

        assert!(local.is_completed(0));
        assert!(local.is_completed(1));
        assert_eq!(local.get(2).unwrap().comprehension_score(), 85.0);
        assert!(local.is_completed(3));
    }

    #[test]
    fn test_odd_detail_fields_keep_step_completed() {
        let basic = parse(json!({}));
        let detailed = parse(json!({
            "2": {"completed": true, "comprehension_score": 80, "time_spent": 12.5},
            "3": {"comprehension_score": "high", "difficulty_rating": 4.5, "notes": 7},
            "4": "recorded"
        }));

        let merged = merge_progress(&basic, &detailed);

        let two = merged.get(2).unwrap().details().unwrap();
        assert!(two.completed);
        assert_eq!(two.comprehension_score, Some(80.0));
        assert_eq!(two.time_spent, Some(12.5));

        let three = merged.get(3).unwrap().details().unwrap();
        assert!(three.completed);
        assert_eq!(three.comprehension_score, None);
        assert_eq!(three.difficulty_rating, None);
        assert_eq!(three.notes.as_deref(), Some("7"));

        assert!(merged.is_completed(4));
        assert_eq!(merged.completed_count(), 3);
    }
}
