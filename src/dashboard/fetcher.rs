//! Remote data fetcher
//!
//! Loads the four dashboard sources (profile, analytics, recommendations,
//! insights) concurrently on the current task. Only the profile is
//! required; the other three degrade to an empty default when they fail.

use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};

use super::error::{DashboardError, DashboardResult};
use super::state::{DashboardState, LoadPhase, SourceUpdate};
use crate::client::{ClientResult, LearningApi};
use crate::model::{AnalyticsSnapshot, Insights, Recommendation, UserProfile};

/// All four sources after every request has settled
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub profile: UserProfile,
    pub analytics: Option<AnalyticsSnapshot>,
    pub recommendations: Vec<Recommendation>,
    pub insights: Option<Insights>,
}

impl DashboardSnapshot {
    pub fn into_updates(self) -> [SourceUpdate; 4] {
        [
            SourceUpdate::Profile(self.profile),
            SourceUpdate::Analytics(self.analytics),
            SourceUpdate::Recommendations(self.recommendations),
            SourceUpdate::Insights(self.insights),
        ]
    }
}

/// Fetches dashboard data from a [`LearningApi`]
pub struct DashboardFetcher<A> {
    api: A,
}

impl<A: LearningApi> DashboardFetcher<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Load every source, applying each to `state` as soon as it resolves.
    ///
    /// `state` is in [`LoadPhase::Loading`] until all four have settled.
    /// A profile failure stops the load and leaves the state `Failed`.
    pub async fn load(&self, user_id: &str, state: &mut DashboardState) -> DashboardResult<()> {
        state.set_phase(LoadPhase::Loading);
        tracing::info!(user_id = %user_id, "Loading dashboard");

        let mut pending: FuturesUnordered<BoxFuture<'_, DashboardResult<SourceUpdate>>> =
            FuturesUnordered::new();

        pending.push(
            async move {
                self.api
                    .user(user_id)
                    .await
                    .map(SourceUpdate::Profile)
                    .map_err(DashboardError::ProfileUnavailable)
            }
            .boxed(),
        );
        pending.push(
            async move {
                let analytics = soft("analytics", user_id, self.api.analytics(user_id).await);
                Ok(SourceUpdate::Analytics(analytics))
            }
            .boxed(),
        );
        pending.push(
            async move {
                let recommendations =
                    soft("recommendations", user_id, self.api.recommendations(user_id).await);
                Ok(SourceUpdate::Recommendations(recommendations.unwrap_or_default()))
            }
            .boxed(),
        );
        pending.push(
            async move {
                let insights = soft("insights", user_id, self.api.insights(user_id).await);
                Ok(SourceUpdate::Insights(insights))
            }
            .boxed(),
        );

        while let Some(result) = pending.next().await {
            match result {
                Ok(update) => state.apply(update),
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Dashboard load failed");
                    state.set_phase(LoadPhase::Failed(e.to_string()));
                    return Err(e);
                }
            }
        }

        state.set_phase(LoadPhase::Ready);
        tracing::info!(
            user_id = %user_id,
            steps = state.profile().map(|p| p.learning_path.len()).unwrap_or(0),
            completed = state.progress().completed_count(),
            recommendations = state.recommendations().len(),
            "Dashboard loaded"
        );
        Ok(())
    }

    /// Fetch every source and return them together once all have settled
    pub async fn fetch_snapshot(&self, user_id: &str) -> DashboardResult<DashboardSnapshot> {
        let (profile, analytics, recommendations, insights) = tokio::join!(
            self.api.user(user_id),
            self.api.analytics(user_id),
            self.api.recommendations(user_id),
            self.api.insights(user_id),
        );

        let profile = profile.map_err(DashboardError::ProfileUnavailable)?;
        Ok(DashboardSnapshot {
            profile,
            analytics: soft("analytics", user_id, analytics),
            recommendations: soft("recommendations", user_id, recommendations).unwrap_or_default(),
            insights: soft("insights", user_id, insights),
        })
    }

    /// Re-read recommendations and profile after a completion.
    ///
    /// Both are optional here: a failed source yields no update, so the
    /// state keeps what it has.
    pub async fn refresh_after_completion(&self, user_id: &str) -> Vec<SourceUpdate> {
        let (recommendations, profile) =
            tokio::join!(self.api.recommendations(user_id), self.api.user(user_id));

        let mut updates = Vec::with_capacity(2);
        if let Some(recommendations) = soft("recommendations", user_id, recommendations) {
            updates.push(SourceUpdate::Recommendations(recommendations));
        }
        if let Some(profile) = soft("profile", user_id, profile) {
            updates.push(SourceUpdate::Profile(profile));
        }
        updates
    }
}

/// Turn an optional source's failure into `None`
fn soft<T>(source: &str, user_id: &str, result: ClientResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(source = %source, user_id = %user_id, error = %e, "Optional dashboard source failed");
            None
        }
    }
}
