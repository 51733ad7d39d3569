//! Learning backend REST client
//!
//! HTTP client for every endpoint the dashboard and onboarding flows use.
//! No call is retried; failures are returned to the caller to classify.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::dto::{
    AuthResponse, Credentials, MessageBody, ProgressUpdate, ProgressUpdateResponse,
    RecommendationsResponse, SubmitResponse,
};
use super::error::{ClientError, ClientResult};
use super::LearningApi;
use crate::config::{ApiConfig, RecommendationsEndpoint};
use crate::model::{parse_recommendations, AnalyticsSnapshot, Insights, Recommendation, UserProfile};
use crate::onboarding::{OnboardingForm, OnboardingSubmission};

/// Learning backend REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    recommendations: RecommendationsEndpoint,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            recommendations: RecommendationsEndpoint::default(),
        })
    }

    /// Create a client for an explicit address with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> ClientResult<Self> {
        let config = ApiConfig {
            base_url: Some(base_url.into()),
            ..ApiConfig::default()
        };
        Self::new(&config)
    }

    /// Builder method: choose the recommendations route
    pub fn recommendations_endpoint(mut self, endpoint: RecommendationsEndpoint) -> Self {
        self.recommendations = endpoint;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn user_url(&self, route: &str, user_id: &str) -> String {
        self.url(&format!("{}/{}", route, urlencoding::encode(user_id)))
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        tracing::debug!(email = %credentials.email, "Logging in");
        self.post_json(&self.url("login"), credentials).await
    }

    pub async fn signup(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        tracing::debug!(email = %credentials.email, "Signing up");
        self.post_json(&self.url("signup"), credentials).await
    }

    /// Submit the onboarding questionnaire; the server answers with the generated path
    pub async fn submit_user_data(
        &self,
        user_id: &str,
        form: &OnboardingForm,
    ) -> ClientResult<SubmitResponse> {
        let body = OnboardingSubmission { form, user_id };
        self.post_json(&self.url("submit-user-data"), &body).await
    }

    pub async fn get_user(&self, user_id: &str) -> ClientResult<UserProfile> {
        let value: Value = self.get_json(&self.user_url("user", user_id)).await?;
        Ok(UserProfile::from_value(value))
    }

    pub async fn get_analytics(&self, user_id: &str) -> ClientResult<AnalyticsSnapshot> {
        self.get_json(&self.user_url("analytics", user_id)).await
    }

    pub async fn get_recommendations(&self, user_id: &str) -> ClientResult<Vec<Recommendation>> {
        let url = self.user_url(self.recommendations.path(), user_id);
        let body: RecommendationsResponse = self.get_json(&url).await?;
        Ok(parse_recommendations(body.recommendations))
    }

    pub async fn get_insights(&self, user_id: &str) -> ClientResult<Insights> {
        self.get_json(&self.user_url("insights", user_id)).await
    }

    pub async fn update_progress(
        &self,
        user_id: &str,
        update: &ProgressUpdate,
    ) -> ClientResult<ProgressUpdateResponse> {
        let url = self.user_url("update-progress", user_id);
        let response = self
            .client
            .post(&url)
            .json(update)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let text = Self::success_text(&url, response).await?;
        Ok(ProgressUpdateResponse::from_body(&text))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        Self::decode(url, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> ClientResult<T> {
        let text = Self::success_text(url, response).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(format!("{}: {}", url, e)))
    }

    /// Body of a 2xx response; any other status becomes `ClientError::Api`
    async fn success_text(url: &str, response: Response) -> ClientResult<String> {
        let status = response.status();
        let text = response.text().await.map_err(ClientError::from_transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<MessageBody>(&text)
                .ok()
                .and_then(|body| body.message.or(body.error))
                .unwrap_or(text);
            tracing::debug!(url = %url, status = status.as_u16(), "Backend returned an error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl LearningApi for ApiClient {
    async fn user(&self, user_id: &str) -> ClientResult<UserProfile> {
        self.get_user(user_id).await
    }

    async fn analytics(&self, user_id: &str) -> ClientResult<AnalyticsSnapshot> {
        self.get_analytics(user_id).await
    }

    async fn recommendations(&self, user_id: &str) -> ClientResult<Vec<Recommendation>> {
        self.get_recommendations(user_id).await
    }

    async fn insights(&self, user_id: &str) -> ClientResult<Insights> {
        self.get_insights(user_id).await
    }

    async fn update_progress(
        &self,
        user_id: &str,
        update: &ProgressUpdate,
    ) -> ClientResult<ProgressUpdateResponse> {
        ApiClient::update_progress(self, user_id, update).await
    }
}
