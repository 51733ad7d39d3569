//! Skill aggregation
//!
//! Derives a 2-5 star level per skill from the comprehension scores of
//! completed steps. Levels are never persisted; they are recomputed from
//! the progress map and learning path whenever the view is built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ProgressMap, Step};

pub const MAX_LEVEL: u8 = 5;

/// How to resolve a skill granted by more than one completed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillPolicy {
    /// The highest completed step index granting the skill decides
    #[default]
    LastWrite,
    /// The best level across all granting steps decides
    Highest,
}

/// Star level for a comprehension score (0-100)
pub fn level_for_score(score: f64) -> u8 {
    if score >= 70.0 {
        5
    } else if score >= 50.0 {
        4
    } else if score >= 30.0 {
        3
    } else {
        2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillLevel {
    pub skill: String,
    pub level: u8,
}

impl SkillLevel {
    /// Fill of the progress bar, 0-100
    pub fn percent(&self) -> f64 {
        f64::from(self.level) * 100.0 / f64::from(MAX_LEVEL)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillReport(BTreeMap<String, u8>);

impl SkillReport {
    pub fn level(&self, skill: &str) -> Option<u8> {
        self.0.get(skill).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Skills by descending level, then by name
    pub fn ranked(&self) -> Vec<SkillLevel> {
        let mut levels: Vec<SkillLevel> = self
            .0
            .iter()
            .map(|(skill, level)| SkillLevel {
                skill: skill.clone(),
                level: *level,
            })
            .collect();
        // BTreeMap order already sorts names; a stable sort keeps it for ties
        levels.sort_by(|a, b| b.level.cmp(&a.level));
        levels
    }
}

/// Compute skill levels from completed steps.
///
/// Completed entries are visited in ascending step index. Entries pointing
/// past the end of `steps` are ignored.
pub fn aggregate_skills(progress: &ProgressMap, steps: &[Step], policy: SkillPolicy) -> SkillReport {
    let mut skills = BTreeMap::new();

    for (index, entry) in progress.completed() {
        let Some(step) = steps.get(index) else {
            tracing::debug!(step_index = index, "Completed step is not in the learning path");
            continue;
        };
        let level = level_for_score(entry.comprehension_score());

        for skill in &step.skills_gained {
            match policy {
                SkillPolicy::LastWrite => {
                    skills.insert(skill.clone(), level);
                }
                SkillPolicy::Highest => {
                    let current = skills.entry(skill.clone()).or_insert(level);
                    *current = (*current).max(level);
                }
            }
        }
    }

    SkillReport(skills)
}
