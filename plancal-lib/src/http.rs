// src/http.rs
use crate::model::{format_calendar_date, CalendarDate, PlanRecord};
use crate::store::{StoreError, WorkoutStore};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

pub const CSRF_HEADER: &str = "X-CSRF-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Supplies the anti-forgery token sent with every mutating request.
pub trait CsrfSource {
    fn token(&self, client: &Client) -> Result<String, StoreError>;
}

/// Fetches a fresh token from `GET {base}/auth/csrf` before each write.
#[derive(Debug, Clone)]
pub struct EndpointCsrf {
    url: String,
}

impl EndpointCsrf {
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}/auth/csrf", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Deserialize)]
struct CsrfResponse {
    csrf: String,
}

impl CsrfSource for EndpointCsrf {
    fn token(&self, client: &Client) -> Result<String, StoreError> {
        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| StoreError::Csrf(e.to_string()))?;
        let response = ensure_success(response)?;
        let body: CsrfResponse = response
            .json()
            .map_err(|e| StoreError::Csrf(e.to_string()))?;
        Ok(body.csrf)
    }
}

/// A token known up front (tests, or deployments without session CSRF).
#[derive(Debug, Clone)]
pub struct StaticCsrf(pub String);

impl CsrfSource for StaticCsrf {
    fn token(&self, _client: &Client) -> Result<String, StoreError> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct CreatedResponse {
    id: i64,
}

/// Plans API over HTTP + JSON.
pub struct HttpStore {
    client: Client,
    base_url: String,
    csrf: Box<dyn CsrfSource>,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let csrf = EndpointCsrf::new(base_url);
        Self::with_csrf(base_url, Box::new(csrf))
    }

    pub fn with_csrf(base_url: &str, csrf: Box<dyn CsrfSource>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .cookie_store(true) // session cookie pairs with the CSRF token
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn plans_url(&self) -> String {
        format!("{}/plans", self.base_url)
    }

    fn plan_url(&self, id: i64) -> String {
        format!("{}/plans/{}", self.base_url, id)
    }

    fn send_mutation(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.csrf.token(&self.client)?;
        let response = builder
            .header(CSRF_HEADER, token)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        ensure_success(response)
    }
}

/// Turns a non-2xx response into `StoreError::Status` carrying the body text.
fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
    debug!(status = status.as_u16(), %body, "plans API returned an error");
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

impl WorkoutStore for HttpStore {
    fn load_all(&self) -> Result<Vec<PlanRecord>, StoreError> {
        let url = self.plans_url();
        debug!(%url, "loading plans");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        ensure_success(response)?
            .json::<Vec<PlanRecord>>()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn create(&self, record: &PlanRecord) -> Result<i64, StoreError> {
        let response = self.send_mutation(self.client.post(self.plans_url()).json(record))?;
        let created: CreatedResponse = response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        info!(id = created.id, date = %record.date, "plan created");
        Ok(created.id)
    }

    fn update(&self, id: i64, record: &PlanRecord) -> Result<(), StoreError> {
        self.send_mutation(self.client.put(self.plan_url(id)).json(record))?;
        info!(id, "plan updated");
        Ok(())
    }

    fn move_to(&self, id: i64, date: CalendarDate) -> Result<(), StoreError> {
        let body = json!({ "date": format_calendar_date(date) });
        self.send_mutation(self.client.patch(self.plan_url(id)).json(&body))?;
        info!(id, %date, "plan moved");
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.send_mutation(self.client.delete(self.plan_url(id)))?;
        info!(id, "plan deleted");
        Ok(())
    }
}
