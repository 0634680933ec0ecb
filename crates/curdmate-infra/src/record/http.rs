//! HttpRecordApi -- [`RecordApi`] over the backend's REST endpoints.
//!
//! Endpoints (relative to `{base_url}/{collection}`):
//! - `GET    ?page=&limit=&search=` list or search
//! - `GET    /{id}`                  fetch one
//! - `POST   /`                      create
//! - `PUT    /{id}`                  update
//! - `DELETE /{id}`                  delete
//!
//! The bearer token is wrapped in [`SecretString`] and only exposed when
//! building the `Authorization` header.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use curdmate_core::record::RecordApi;
use curdmate_types::config::RecordApiConfig;
use curdmate_types::error::RecordApiError;
use curdmate_types::record::{NewRecord, Record, RecordId, RecordPage, RecordPatch, RecordQuery};

/// REST client for the record backend.
pub struct HttpRecordApi {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    token: Option<SecretString>,
}

// HttpRecordApi does NOT derive Debug so the token can never be printed.

impl HttpRecordApi {
    pub fn new(config: &RecordApiConfig, token: Option<SecretString>) -> Result<Self, RecordApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecordApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection: config.collection.trim_matches('/').to_string(),
            token,
        })
    }

    /// A client sharing this one's connection pool but sending `token`.
    pub fn with_token(&self, token: Option<SecretString>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            collection: self.collection.clone(),
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    fn record_url(&self, id: &RecordId) -> String {
        if id.is_legacy() {
            debug!(record.id = %id, "legacy 12-character record id");
        }
        format!("{}/{}/{}", self.base_url, self.collection, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send and turn non-success statuses into [`RecordApiError`]s.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, RecordApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RecordApiError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = error_for_status(status, &body);
        warn!(status = status.as_u16(), error = %err, "record API call failed");
        Err(err)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RecordApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| RecordApiError::Deserialization(e.without_url().to_string()))
    }
}

/// List bodies: the paged `{data: [...]}` object or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Array(Vec<Record>),
    Page(RecordPage),
}

/// Single-record bodies: `{data: {...}}` or the record itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneBody {
    Wrapped { data: Record },
    Bare(Record),
}

impl OneBody {
    fn into_record(self) -> Record {
        match self {
            OneBody::Wrapped { data } | OneBody::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Map a failed response to the error the engine reacts to.
///
/// The backend's `{error}` (or `{message}`) text is carried through so the
/// user sees it verbatim.
pub fn error_for_status(status: StatusCode, body: &str) -> RecordApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty());

    match status {
        StatusCode::UNAUTHORIZED => RecordApiError::Unauthorized,
        StatusCode::NOT_FOUND => RecordApiError::NotFound,
        StatusCode::CONFLICT => RecordApiError::Conflict(
            message.unwrap_or_else(|| "A contact with these details already exists.".to_string()),
        ),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => RecordApiError::Rejected(
            message.unwrap_or_else(|| format!("The record API rejected the request ({status}).")),
        ),
        _ => RecordApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

impl RecordApi for HttpRecordApi {
    #[tracing::instrument(name = "record_api.list", skip_all, fields(page = query.page, limit = query.limit))]
    async fn list(&self, query: &RecordQuery) -> Result<RecordPage, RecordApiError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(term) = &query.search {
            params.push(("search", term.as_str().to_string()));
        }

        let url = self.collection_url();
        let response = self
            .send(self.request(Method::GET, &url).query(&params))
            .await?;
        let page = match Self::read_json::<ListBody>(response).await? {
            ListBody::Array(data) => RecordPage {
                data,
                ..Default::default()
            },
            ListBody::Page(page) => page,
        };
        debug!(count = page.data.len(), "records received");
        Ok(page)
    }

    #[tracing::instrument(name = "record_api.get", skip(self), fields(record.id = %id))]
    async fn get(&self, id: &RecordId) -> Result<Record, RecordApiError> {
        let url = self.record_url(id);
        let response = self.send(self.request(Method::GET, &url)).await?;
        Ok(Self::read_json::<OneBody>(response).await?.into_record())
    }

    #[tracing::instrument(name = "record_api.create", skip_all)]
    async fn create(&self, record: &NewRecord) -> Result<Record, RecordApiError> {
        let url = self.collection_url();
        let response = self
            .send(self.request(Method::POST, &url).json(record))
            .await?;
        Ok(Self::read_json::<OneBody>(response).await?.into_record())
    }

    #[tracing::instrument(name = "record_api.update", skip(self, patch), fields(record.id = %id))]
    async fn update(&self, id: &RecordId, patch: &RecordPatch) -> Result<(), RecordApiError> {
        let url = self.record_url(id);
        self.send(self.request(Method::PUT, &url).json(patch)).await?;
        Ok(())
    }

    #[tracing::instrument(name = "record_api.delete", skip(self), fields(record.id = %id))]
    async fn delete(&self, id: &RecordId) -> Result<(), RecordApiError> {
        let url = self.record_url(id);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}
