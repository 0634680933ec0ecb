//! Shared test doubles for the engine tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use curdmate_types::error::RecordApiError;
use curdmate_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};
use curdmate_types::record::{
    NewRecord, Record, RecordId, RecordPage, RecordPatch, RecordQuery, SearchTerm,
};

use crate::llm::provider::LlmProvider;
use crate::record::RecordApi;

pub const ID_A: &str = "507f1f77bcf86cd799439011";
pub const ID_B: &str = "507f1f77bcf86cd799439012";

pub fn record(id: &str, name: &str, email: &str) -> Record {
    Record {
        id: RecordId::parse(id).unwrap(),
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        phone: Some("+91 9876543210".to_string()),
        age: Some(30),
        address: None,
    }
}

/// One call received by [`MockRecordApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List(RecordQuery),
    Get(RecordId),
    Create(NewRecord),
    Update(RecordId, RecordPatch),
    Delete(RecordId),
}

/// In-memory record store that logs every call.
#[derive(Default)]
pub struct MockRecordApi {
    records: Mutex<Vec<Record>>,
    calls: Mutex<Vec<ApiCall>>,
    failure: Mutex<Option<fn() -> RecordApiError>>,
}

impl MockRecordApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        let api = Self::default();
        *api.records.lock().unwrap() = records;
        api
    }

    /// Every subsequent call fails with the error built by `make`.
    pub fn fail_with(&self, make: fn() -> RecordApiError) {
        *self.failure.lock().unwrap() = Some(make);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<RecordId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<NewRecord> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Create(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn begin(&self, call: ApiCall) -> Result<(), RecordApiError> {
        self.calls.lock().unwrap().push(call);
        match *self.failure.lock().unwrap() {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

impl RecordApi for MockRecordApi {
    async fn list(&self, query: &RecordQuery) -> Result<RecordPage, RecordApiError> {
        self.begin(ApiCall::List(query.clone()))?;
        let records = self.records.lock().unwrap();
        let data = records
            .iter()
            .filter(|r| match &query.search {
                None => true,
                Some(SearchTerm::Name(t)) => r.name.as_deref().is_some_and(|n| n.contains(t.as_str())),
                Some(SearchTerm::Email(t)) => r.email.as_deref() == Some(t.as_str()),
            })
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(RecordPage {
            data,
            total: None,
            page: Some(query.page),
        })
    }

    async fn get(&self, id: &RecordId) -> Result<Record, RecordApiError> {
        self.begin(ApiCall::Get(id.clone()))?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or(RecordApiError::NotFound)
    }

    async fn create(&self, record: &NewRecord) -> Result<Record, RecordApiError> {
        self.begin(ApiCall::Create(record.clone()))?;
        let mut records = self.records.lock().unwrap();
        if record.email.is_some() && records.iter().any(|r| r.email == record.email) {
            return Err(RecordApiError::Conflict(
                "A contact with this email already exists".to_string(),
            ));
        }
        let id = format!("{:024x}", records.len() + 1);
        let stored = Record {
            id: RecordId::parse(&id).unwrap(),
            name: Some(record.name.clone()),
            email: record.email.clone(),
            phone: record.phone.clone(),
            age: record.age,
            address: record.address.clone(),
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &RecordId, patch: &RecordPatch) -> Result<(), RecordApiError> {
        self.begin(ApiCall::Update(id.clone(), patch.clone()))?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(RecordApiError::NotFound)?;
        if let Some(ref v) = patch.email {
            record.email = Some(v.clone());
        }
        if let Some(ref v) = patch.name {
            record.name = Some(v.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RecordApiError> {
        self.begin(ApiCall::Delete(id.clone()))?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(RecordApiError::NotFound);
        }
        Ok(())
    }
}

/// Completion provider returning canned replies in order.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<(String, StopReason), String>>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .iter()
                    .map(|r| Ok((r.to_string(), StopReason::EndTurn)))
                    .collect(),
            ),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            capabilities: ProviderCapabilities {
                json_mode: true,
                max_output_tokens: 4_096,
            },
        }
    }

    /// A single reply cut off at the token limit.
    pub fn truncated(reply: &str) -> Self {
        let provider = Self::replying(&[]);
        provider
            .replies
            .lock()
            .unwrap()
            .push_back(Ok((reply.to_string(), StopReason::MaxTokens)));
        provider
    }

    pub fn failing(message: &str) -> Self {
        let provider = Self::replying(&[]);
        provider
            .replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        provider
    }

    pub fn with_capabilities(mut self, json_mode: bool, max_output_tokens: u32) -> Self {
        self.capabilities = ProviderCapabilities {
            json_mode,
            max_output_tokens,
        };
        self
    }

    /// Shared counter of `complete` calls, readable after the provider is boxed.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Every request received so far.
    pub fn request_log(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok((content, stop_reason))) => Ok(CompletionResponse {
                id: "resp-scripted".to_string(),
                content,
                model: request.model.clone(),
                stop_reason,
                usage: Usage::default(),
            }),
            Some(Err(message)) => Err(LlmError::Provider { message }),
            None => Err(LlmError::Provider {
                message: "script exhausted".to_string(),
            }),
        }
    }
}
