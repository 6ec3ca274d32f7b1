//! Reqwest-backed schedule API client.
//!
//! Thin glue: build URL, send, map the response. Timeouts are the
//! transport's own; no retry layer lives here because the cache repository
//! decides what a failed fetch means.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiError, ApiFailure, ApiResult, MedicineUpsert, ScheduleApi, TakeDoseRequest};
use crate::core::models::{
    AdherenceStats, DailySchedule, IntakeEvent, InventoryWarning, Medicine, MedicineHit,
};

/// HTTP client for the schedule API
pub struct HttpScheduleApi {
    client: Client,
    base_url: String,
}

impl HttpScheduleApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpScheduleApi {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and decode the JSON body, classifying failures
    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = self.url(path);
        debug!("{method} {url}");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiFailure::Transport(format!("invalid response body: {e}")))
        } else if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            // Gateway/server trouble counts as unreachable for fallback
            // purposes
            Err(ApiFailure::Transport(format!("server error {status}")))
        } else {
            let error = response.json::<ApiError>().await.unwrap_or(ApiError {
                message: format!("request failed with status {status}"),
                code: status.as_u16(),
            });
            Err(ApiFailure::Rejected(error))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.send(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl ScheduleApi for HttpScheduleApi {
    async fn upcoming_intakes(&self, user_id: &str, hours: u32) -> ApiResult<Vec<IntakeEvent>> {
        self.get(&format!("users/{user_id}/intakes/upcoming?hours={hours}"))
            .await
    }

    async fn daily_schedule(&self, user_id: &str, date: NaiveDate) -> ApiResult<DailySchedule> {
        self.get(&format!("users/{user_id}/schedule/{date}")).await
    }

    async fn overdue_intakes(&self, user_id: &str) -> ApiResult<Vec<IntakeEvent>> {
        self.get(&format!("users/{user_id}/intakes/overdue")).await
    }

    async fn list_medicines(&self, user_id: &str) -> ApiResult<Vec<Medicine>> {
        self.get(&format!("users/{user_id}/medicines")).await
    }

    async fn create_medicine(
        &self,
        user_id: &str,
        medicine: &MedicineUpsert,
    ) -> ApiResult<Medicine> {
        self.post(&format!("users/{user_id}/medicines"), medicine)
            .await
    }

    async fn update_medicine(
        &self,
        user_id: &str,
        medicine_id: &str,
        medicine: &MedicineUpsert,
    ) -> ApiResult<Medicine> {
        self.send(
            Method::PUT,
            &format!("users/{user_id}/medicines/{medicine_id}"),
            Some(medicine),
        )
        .await
    }

    async fn delete_medicine(&self, user_id: &str, medicine_id: &str) -> ApiResult<()> {
        self.send::<(), serde_json::Value>(
            Method::DELETE,
            &format!("users/{user_id}/medicines/{medicine_id}"),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn pause_medicine(&self, user_id: &str, medicine_id: &str) -> ApiResult<()> {
        self.post::<_, serde_json::Value>(
            &format!("users/{user_id}/medicines/{medicine_id}/pause"),
            &(),
        )
        .await
        .map(|_| ())
    }

    async fn resume_medicine(&self, user_id: &str, medicine_id: &str) -> ApiResult<()> {
        self.post::<_, serde_json::Value>(
            &format!("users/{user_id}/medicines/{medicine_id}/resume"),
            &(),
        )
        .await
        .map(|_| ())
    }

    async fn take_dose(
        &self,
        user_id: &str,
        event_id: &str,
        request: &TakeDoseRequest,
    ) -> ApiResult<IntakeEvent> {
        self.post(&format!("users/{user_id}/intakes/{event_id}/take"), request)
            .await
    }

    async fn skip_dose(&self, user_id: &str, event_id: &str) -> ApiResult<IntakeEvent> {
        self.post(&format!("users/{user_id}/intakes/{event_id}/skip"), &())
            .await
    }

    async fn mark_missed(&self, user_id: &str, event_id: &str) -> ApiResult<IntakeEvent> {
        self.post(&format!("users/{user_id}/intakes/{event_id}/missed"), &())
            .await
    }

    async fn update_inventory(
        &self,
        user_id: &str,
        medicine_id: &str,
        amount: f64,
    ) -> ApiResult<()> {
        #[derive(Serialize)]
        struct Body {
            amount: f64,
        }
        self.post::<_, serde_json::Value>(
            &format!("users/{user_id}/medicines/{medicine_id}/inventory"),
            &Body { amount },
        )
        .await
        .map(|_| ())
    }

    async fn low_inventory(&self, user_id: &str) -> ApiResult<Vec<InventoryWarning>> {
        self.get(&format!("users/{user_id}/inventory/low")).await
    }

    async fn adherence_stats(&self, user_id: &str, period: &str) -> ApiResult<AdherenceStats> {
        self.get(&format!("users/{user_id}/stats?period={period}"))
            .await
    }

    async fn search_medicines(&self, query: &str) -> ApiResult<Vec<MedicineHit>> {
        self.get(&format!("medicines/search?q={query}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let api = HttpScheduleApi::new("https://api.example.com/v1");
        assert_eq!(
            api.url("users/u1/medicines"),
            "https://api.example.com/v1/users/u1/medicines"
        );
    }
}
