//! Dashboard view state
//!
//! The single mutable piece of the client: profile, merged progress,
//! analytics, recommendations and insights, plus the set of steps with a
//! completion submission in flight. Every mutation goes through
//! [`DashboardState::apply`] or the completion methods.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::error::{DashboardError, DashboardResult};
use crate::client::ProgressUpdate;
use crate::model::{
    AnalyticsSnapshot, DetailedProgress, Insights, ProgressEntry, ProgressMap, Recommendation,
    UserProfile,
};

/// Where the first full load stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// The result of one data source, applied as soon as it resolves
#[derive(Debug, Clone)]
pub enum SourceUpdate {
    Profile(UserProfile),
    Analytics(Option<AnalyticsSnapshot>),
    Recommendations(Vec<Recommendation>),
    Insights(Option<Insights>),
}

impl SourceUpdate {
    pub fn source(&self) -> &'static str {
        match self {
            SourceUpdate::Profile(_) => "profile",
            SourceUpdate::Analytics(_) => "analytics",
            SourceUpdate::Recommendations(_) => "recommendations",
            SourceUpdate::Insights(_) => "insights",
        }
    }
}

/// Learner self-assessment sent with a step completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentInput {
    /// 1 (easy) to 5 (hard)
    pub difficulty_rating: u8,
    /// 0-100
    pub comprehension_score: f64,
    #[serde(default)]
    pub notes: String,
    /// Minutes
    pub time_spent: u32,
}

impl AssessmentInput {
    pub fn validate(&self) -> DashboardResult<()> {
        if !(1..=5).contains(&self.difficulty_rating) {
            return Err(DashboardError::InvalidAssessment(format!(
                "difficulty rating must be between 1 and 5, got {}",
                self.difficulty_rating
            )));
        }
        if !(0.0..=100.0).contains(&self.comprehension_score) {
            return Err(DashboardError::InvalidAssessment(format!(
                "comprehension score must be between 0 and 100, got {}",
                self.comprehension_score
            )));
        }
        Ok(())
    }

    pub fn to_update(&self, step_index: usize) -> ProgressUpdate {
        ProgressUpdate {
            step_index,
            difficulty_rating: self.difficulty_rating,
            comprehension_score: self.comprehension_score,
            notes: self.notes.clone(),
            time_spent: self.time_spent,
        }
    }

    /// The progress entry recorded locally once the server accepted it
    pub fn to_entry(&self, completed_at: DateTime<Utc>) -> ProgressEntry {
        ProgressEntry::Detailed(DetailedProgress {
            completed: true,
            difficulty_rating: Some(self.difficulty_rating),
            comprehension_score: Some(self.comprehension_score),
            time_spent: Some(f64::from(self.time_spent)),
            notes: Some(self.notes.clone()),
            completed_at: Some(completed_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    phase: LoadPhase,
    profile: Option<UserProfile>,
    progress: ProgressMap,
    analytics: Option<AnalyticsSnapshot>,
    recommendations: Vec<Recommendation>,
    insights: Option<Insights>,
    updating: BTreeSet<usize>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn set_phase(&mut self, phase: LoadPhase) {
        self.phase = phase;
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Merged progress, including optimistic local completions
    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    pub fn analytics(&self) -> Option<&AnalyticsSnapshot> {
        self.analytics.as_ref()
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn insights(&self) -> Option<&Insights> {
        self.insights.as_ref()
    }

    /// Fold one source's result into the state.
    ///
    /// A profile reconciles progress without dropping known completions;
    /// analytics are merged additively and a `None` keeps what is known.
    pub fn apply(&mut self, update: SourceUpdate) {
        tracing::trace!(source = update.source(), "Applying source update");
        match update {
            SourceUpdate::Profile(profile) => {
                self.progress.reconcile(profile.progress.clone());
                self.profile = Some(profile);
            }
            SourceUpdate::Analytics(Some(snapshot)) => self.merge_analytics(&snapshot),
            SourceUpdate::Analytics(None) => {}
            SourceUpdate::Recommendations(recommendations) => {
                self.recommendations = recommendations;
            }
            SourceUpdate::Insights(insights) => {
                if insights.is_some() || self.insights.is_none() {
                    self.insights = insights;
                }
            }
        }
    }

    fn merge_analytics(&mut self, snapshot: &AnalyticsSnapshot) {
        match &mut self.analytics {
            Some(existing) => existing.merge(snapshot),
            None => self.analytics = Some(snapshot.clone()),
        }
    }

    pub fn is_updating(&self, step_index: usize) -> bool {
        self.updating.contains(&step_index)
    }

    pub fn updating_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.updating.iter().copied()
    }

    /// Mark a step as updating before its submission is sent.
    ///
    /// Fails if the same step already has a submission in flight; other
    /// steps may be submitted concurrently.
    pub fn begin_completion(&mut self, step_index: usize) -> DashboardResult<()> {
        if let Some(profile) = &self.profile {
            if step_index >= profile.learning_path.len() {
                return Err(DashboardError::UnknownStep(step_index));
            }
        }
        if !self.updating.insert(step_index) {
            return Err(DashboardError::StepBusy(step_index));
        }
        Ok(())
    }

    /// Record an accepted submission without waiting for a refetch
    pub fn commit_completion(
        &mut self,
        step_index: usize,
        input: &AssessmentInput,
        completed_at: DateTime<Utc>,
        analytics: Option<&AnalyticsSnapshot>,
    ) {
        self.updating.remove(&step_index);
        self.progress.insert(step_index, input.to_entry(completed_at));
        if let Some(snapshot) = analytics {
            self.merge_analytics(snapshot);
        }
    }

    /// Drop the in-flight marker after a failed submission; progress is untouched
    pub fn abort_completion(&mut self, step_index: usize) {
        self.updating.remove(&step_index);
    }
}
