//! Learning backend client
//!
//! - **client**: `ApiClient`, the reqwest-based REST client
//! - **dto**: request and response bodies
//! - **error**: `ClientError` taxonomy
//!
//! The dashboard only depends on the [`LearningApi`] trait, so it can be
//! driven by anything that answers the same calls.

mod client;
pub mod dto;
mod error;

use async_trait::async_trait;

use crate::model::{AnalyticsSnapshot, Insights, Recommendation, UserProfile};

pub use client::ApiClient;
pub use dto::{AuthResponse, Credentials, ProgressUpdate, ProgressUpdateResponse, SubmitResponse};
pub use error::{ClientError, ClientResult};

/// The backend calls the dashboard needs
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// `GET /user/{id}`, normalized
    async fn user(&self, user_id: &str) -> ClientResult<UserProfile>;

    /// `GET /analytics/{id}`
    async fn analytics(&self, user_id: &str) -> ClientResult<AnalyticsSnapshot>;

    /// Recommendation list; malformed entries already dropped
    async fn recommendations(&self, user_id: &str) -> ClientResult<Vec<Recommendation>>;

    /// `GET /insights/{id}`
    async fn insights(&self, user_id: &str) -> ClientResult<Insights>;

    /// `POST /update-progress/{id}`
    async fn update_progress(
        &self,
        user_id: &str,
        update: &ProgressUpdate,
    ) -> ClientResult<ProgressUpdateResponse>;
}
