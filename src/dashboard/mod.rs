//! Learner Dashboard
//!
//! Assembles the dashboard view model from the learning backend.
//!
//! ## Architecture
//!
//! - **fetcher**: concurrent load of profile, analytics, recommendations, insights
//! - **state**: the mutable view state and step completion bookkeeping
//! - **skills**: skill levels derived from completed steps
//! - **view**: render-ready view model
//!
//! ## Data Flow
//!
//! 1. `DashboardFetcher` loads the four sources; each is applied to
//!    `DashboardState` as soon as it resolves
//! 2. Progress from the profile is merged (basic + detailed) and reconciled
//!    with anything known locally
//! 3. `DashboardView` derives skills and recommendation buckets on demand
//! 4. `Dashboard::complete_step` submits an assessment, records it
//!    optimistically, then refreshes recommendations and profile

mod error;
mod fetcher;
mod skills;
mod state;
mod view;

use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::LearningApi;

pub use error::{DashboardError, DashboardResult};
pub use fetcher::{DashboardFetcher, DashboardSnapshot};
pub use skills::{aggregate_skills, level_for_score, SkillLevel, SkillPolicy, SkillReport, MAX_LEVEL};
pub use state::{AssessmentInput, DashboardState, LoadPhase, SourceUpdate};
pub use view::{DashboardView, StepView};

/// One learner's dashboard: the fetcher, its state, and the skill policy.
///
/// Loading and rendering take `&mut self`. Step completions take `&self`,
/// so submissions for different steps can be in flight together. The state
/// lock is only held between awaits, never across a request.
pub struct Dashboard<A> {
    fetcher: DashboardFetcher<A>,
    user_id: String,
    state: Mutex<DashboardState>,
    policy: SkillPolicy,
}

impl<A: LearningApi> Dashboard<A> {
    pub fn new(api: A, user_id: impl Into<String>) -> Self {
        Self {
            fetcher: DashboardFetcher::new(api),
            user_id: user_id.into(),
            state: Mutex::new(DashboardState::new()),
            policy: SkillPolicy::default(),
        }
    }

    /// Builder method: duplicate skill resolution
    pub fn skill_policy(mut self, policy: SkillPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&mut self) -> &DashboardState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a completion for `step_index` is in flight
    pub fn is_updating(&self, step_index: usize) -> bool {
        self.lock().is_updating(step_index)
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initial load, committing each source as it arrives
    pub async fn load(&mut self) -> DashboardResult<()> {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        self.fetcher.load(&self.user_id, state).await
    }

    /// Load every source, then commit them together
    pub async fn load_all(&mut self) -> DashboardResult<()> {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.set_phase(LoadPhase::Loading);
        match self.fetcher.fetch_snapshot(&self.user_id).await {
            Ok(snapshot) => {
                for update in snapshot.into_updates() {
                    state.apply(update);
                }
                state.set_phase(LoadPhase::Ready);
                Ok(())
            }
            Err(e) => {
                state.set_phase(LoadPhase::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn view(&mut self) -> DashboardView<'_> {
        let policy = self.policy;
        DashboardView::build(self.state(), policy)
    }

    /// Submit a step completion.
    ///
    /// On success the step is recorded locally as completed right away and
    /// recommendations and profile are refreshed. On failure local state is
    /// left exactly as it was and the step can be submitted again. A second
    /// submission for a step already in flight fails with `StepBusy`.
    pub async fn complete_step(
        &self,
        step_index: usize,
        input: &AssessmentInput,
    ) -> DashboardResult<()> {
        input.validate()?;
        self.lock().begin_completion(step_index)?;

        let update = input.to_update(step_index);
        let result = self.fetcher.api().update_progress(&self.user_id, &update).await;
        match result {
            Ok(response) => {
                self.lock()
                    .commit_completion(step_index, input, Utc::now(), response.analytics.as_ref());
                tracing::info!(
                    user_id = %self.user_id,
                    step_index,
                    comprehension_score = input.comprehension_score,
                    "Step completed"
                );
            }
            Err(e) => {
                self.lock().abort_completion(step_index);
                tracing::error!(user_id = %self.user_id, step_index, error = %e, "Failed to update progress");
                return Err(DashboardError::Submission {
                    step: step_index,
                    source: e,
                });
            }
        }

        let updates = self.fetcher.refresh_after_completion(&self.user_id).await;
        let mut state = self.lock();
        for update in updates {
            state.apply(update);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::fetcher::testing::FakeApi;
    use super::*;
    use crate::model::ProgressEntry;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn api(accept_updates: bool) -> FakeApi {
        FakeApi {
            profile: Some(json!({
                "id": 1,
                "learning_path": [
                    {"title": "A", "skills_gained": ["Python"]},
                    {"title": "B", "skills_gained": ["Python"]},
                    {"title": "C", "skills_gained": ["SQL"]}
                ],
                "progress": {"0": true, "2": false},
                "detailed_progress": {"0": {"comprehension_score": 90}}
            })),
            accept_updates,
            ..Default::default()
        }
    }

    fn input() -> AssessmentInput {
        AssessmentInput {
            difficulty_rating: 4,
            comprehension_score: 85.0,
            notes: "easy".to_string(),
            time_spent: 30,
        }
    }

    #[tokio::test]
    async fn test_complete_step_records_entry() {
        let mut dashboard = Dashboard::new(api(true), "1");
        dashboard.load().await.unwrap();

        dashboard.complete_step(2, &input()).await.unwrap();

        let entry = dashboard.state().progress().get(2).unwrap().details().unwrap().clone();
        assert!(entry.completed);
        assert_eq!(entry.difficulty_rating, Some(4));
        assert_eq!(entry.comprehension_score, Some(85.0));
        assert_eq!(entry.time_spent, Some(30.0));
        assert_eq!(entry.notes.as_deref(), Some("easy"));
        assert!(entry.completed_at.is_some());
        assert!(!dashboard.state().is_updating(2));

        let sent = dashboard.fetcher.api().updates.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].step_index, 2);

        // The refreshed profile still says incomplete; the local completion stands
        assert!(dashboard.state().progress().is_completed(2));
        assert_eq!(dashboard.view().completed_steps, 2);
    }

    #[tokio::test]
    async fn test_failed_submission_leaves_state_unchanged() {
        let mut dashboard = Dashboard::new(api(false), "1");
        dashboard.load().await.unwrap();
        let before = dashboard.state().progress().clone();

        let err = dashboard.complete_step(2, &input()).await.unwrap_err();
        assert!(matches!(err, DashboardError::Submission { step: 2, .. }));

        assert_eq!(dashboard.state().progress(), &before);
        assert_eq!(
            dashboard.state().progress().get(2),
            Some(&ProgressEntry::Simple { completed: false })
        );
        assert!(!dashboard.state().is_updating(2));
    }

    #[tokio::test]
    async fn test_invalid_assessment_is_rejected_before_sending() {
        let mut dashboard = Dashboard::new(api(true), "1");
        dashboard.load().await.unwrap();

        let mut bad = input();
        bad.difficulty_rating = 9;
        assert!(matches!(
            dashboard.complete_step(1, &bad).await,
            Err(DashboardError::InvalidAssessment(_))
        ));
        assert!(dashboard.fetcher.api().updates.lock().unwrap().is_empty());
        assert!(!dashboard.state().is_updating(1));
    }

    #[tokio::test]
    async fn test_skill_policy_is_applied_to_view() {
        let mut dashboard = Dashboard::new(api(true), "1").skill_policy(SkillPolicy::Highest);
        dashboard.load_all().await.unwrap();
        dashboard
            .complete_step(1, &AssessmentInput { comprehension_score: 10.0, ..input() })
            .await
            .unwrap();

        let python = dashboard.view().skills.into_iter().find(|s| s.skill == "Python").unwrap();
        assert_eq!(python.level, 5);
    }

    #[tokio::test]
    async fn test_different_steps_submit_concurrently() {
        let mut dashboard = Dashboard::new(api(true), "1");
        dashboard.load().await.unwrap();
        let assessment = input();

        let (first, second) = tokio::join!(
            dashboard.complete_step(1, &assessment),
            dashboard.complete_step(2, &assessment),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(dashboard.fetcher.api().max_in_flight.load(Ordering::SeqCst), 2);
        assert!(!dashboard.is_updating(1));
        assert!(!dashboard.is_updating(2));
        assert!(dashboard.state().progress().is_completed(1));
        assert!(dashboard.state().progress().is_completed(2));
        assert_eq!(dashboard.view().completed_steps, 3);
    }

    #[tokio::test]
    async fn test_same_step_submission_is_busy() {
        let mut dashboard = Dashboard::new(api(true), "1");
        dashboard.load().await.unwrap();
        let assessment = input();

        let (first, second) = tokio::join!(
            dashboard.complete_step(2, &assessment),
            dashboard.complete_step(2, &assessment),
        );

        let (accepted, busy): (Vec<_>, Vec<_>) = [first, second].into_iter().partition(Result::is_ok);
        assert_eq!(accepted.len(), 1);
        assert_eq!(busy.len(), 1);
        assert!(matches!(busy[0], Err(DashboardError::StepBusy(2))));

        assert_eq!(dashboard.fetcher.api().updates.lock().unwrap().len(), 1);
        assert!(!dashboard.is_updating(2));
        assert!(dashboard.state().progress().is_completed(2));
    }
}
