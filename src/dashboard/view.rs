//! Render-ready view model
//!
//! Everything a renderer needs, derived from [`DashboardState`] on demand.

use super::skills::{aggregate_skills, SkillLevel, SkillPolicy};
use super::state::{DashboardState, LoadPhase};
use crate::model::{
    classify, AnalyticsSnapshot, Insights, ProgressEntry, RecommendationBuckets, Step, UserProfile,
};

/// One learning path step with its progress
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    pub index: usize,
    pub step: &'a Step,
    pub progress: Option<&'a ProgressEntry>,
    pub updating: bool,
}

impl StepView<'_> {
    pub fn is_completed(&self) -> bool {
        self.progress.map(ProgressEntry::is_completed).unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct DashboardView<'a> {
    pub phase: &'a LoadPhase,
    pub profile: Option<&'a UserProfile>,
    pub steps: Vec<StepView<'a>>,
    pub completed_steps: usize,
    /// Skills by descending level
    pub skills: Vec<SkillLevel>,
    pub recommendations: RecommendationBuckets<'a>,
    pub analytics: Option<&'a AnalyticsSnapshot>,
    pub insights: Option<&'a Insights>,
}

impl<'a> DashboardView<'a> {
    pub fn build(state: &'a DashboardState, policy: SkillPolicy) -> Self {
        let path: &[Step] = state.profile().map(|p| p.learning_path.as_slice()).unwrap_or(&[]);
        let progress = state.progress();

        let steps: Vec<StepView<'a>> = path
            .iter()
            .enumerate()
            .map(|(index, step)| StepView {
                index,
                step,
                progress: progress.get(index),
                updating: state.is_updating(index),
            })
            .collect();
        let completed_steps = steps.iter().filter(|s| s.is_completed()).count();

        Self {
            phase: state.phase(),
            profile: state.profile(),
            steps,
            completed_steps,
            skills: aggregate_skills(progress, path, policy).ranked(),
            recommendations: classify(state.recommendations()),
            analytics: state.analytics(),
            insights: state.insights(),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Share of the learning path completed, 0-100
    pub fn completion_percent(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.completed_steps as f64 * 100.0 / self.steps.len() as f64
        }
    }
}
