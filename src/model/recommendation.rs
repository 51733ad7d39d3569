//! Server recommendations and their classification into display buckets

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::profile::Step;
use crate::parse::{lenient, lenient_text};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextStepContext {
    #[serde(default, deserialize_with = "lenient_text")]
    pub estimated_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewContext {
    #[serde(default, deserialize_with = "lenient")]
    pub previous_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillBoosterContext {
    #[serde(default, deserialize_with = "lenient_text")]
    pub career_impact: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub aligned_goals: Vec<String>,
}

/// A server-suggested next action, tagged by `type`.
///
/// The `context` is display-only; one that does not fit its shape is
/// replaced by the default rather than dropping the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    NextStep {
        step: Step,
        step_index: usize,
        #[serde(default, deserialize_with = "lenient")]
        context: NextStepContext,
    },
    Review {
        step: Step,
        step_index: usize,
        #[serde(default, deserialize_with = "lenient")]
        context: ReviewContext,
    },
    SkillBooster {
        step: Step,
        step_index: usize,
        #[serde(default, deserialize_with = "lenient")]
        context: SkillBoosterContext,
    },
    /// Any `type` this client does not know how to display
    #[serde(other)]
    Unknown,
}

impl Recommendation {
    pub fn step(&self) -> Option<(usize, &Step)> {
        match self {
            Recommendation::NextStep { step, step_index, .. }
            | Recommendation::Review { step, step_index, .. }
            | Recommendation::SkillBooster { step, step_index, .. } => Some((*step_index, step)),
            Recommendation::Unknown => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Recommendation::NextStep { .. } => "next_step",
            Recommendation::Review { .. } => "review",
            Recommendation::SkillBooster { .. } => "skill_booster",
            Recommendation::Unknown => "unknown",
        }
    }
}

/// Decode a recommendation list entry by entry.
///
/// One malformed entry does not discard the others; it is logged and skipped.
pub fn parse_recommendations(values: Vec<Value>) -> Vec<Recommendation> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match serde_json::from_value(value) {
            Ok(recommendation) => Some(recommendation),
            Err(e) => {
                tracing::warn!(position, error = %e, "Skipping malformed recommendation");
                None
            }
        })
        .collect()
}

/// Recommendations split by display section, in their original order
#[derive(Debug, Default, PartialEq)]
pub struct RecommendationBuckets<'a> {
    pub next_steps: Vec<&'a Recommendation>,
    pub reviews: Vec<&'a Recommendation>,
    pub skill_boosters: Vec<&'a Recommendation>,
}

impl RecommendationBuckets<'_> {
    pub fn len(&self) -> usize {
        self.next_steps.len() + self.reviews.len() + self.skill_boosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition recommendations by type. Unknown types land in no bucket.
pub fn classify(recommendations: &[Recommendation]) -> RecommendationBuckets<'_> {
    let mut buckets = RecommendationBuckets::default();
    for recommendation in recommendations {
        match recommendation {
            Recommendation::NextStep { .. } => buckets.next_steps.push(recommendation),
            Recommendation::Review { .. } => buckets.reviews.push(recommendation),
            Recommendation::SkillBooster { .. } => buckets.skill_boosters.push(recommendation),
            Recommendation::Unknown => {}
        }
    }
    buckets
}
