//! Application state shared by the chat loop and the REST API.
//!
//! `AppState` holds the loaded configuration, the record API client, the
//! intent resolver, and the live chat sessions served over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use secrecy::SecretString;
use tokio::sync::Mutex;
use uuid::Uuid;

use curdmate_core::chat::ChatSession;
use curdmate_core::conversation::machine::ConversationEngine;
use curdmate_core::executor::CommandExecutor;
use curdmate_core::intent::nlp::IntentResolver;
use curdmate_infra::config::{load_config, resolve_data_dir};
use curdmate_infra::llm::build_resolver;
use curdmate_infra::record::HttpRecordApi;
use curdmate_infra::secret::secret_from_env;
use curdmate_types::config::AppConfig;

/// A chat session bound to the HTTP record API.
pub type Session = ChatSession<HttpRecordApi>;

/// Live sessions keyed by id. Each session serializes its own turns.
pub type SessionMap = DashMap<Uuid, Arc<Mutex<Session>>>;

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.record_api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Shared application state.
///
/// Cheap to clone: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    /// Client carrying the token from `[record_api] token_env`, if any.
    pub record_api: Arc<HttpRecordApi>,
    pub resolver: Arc<IntentResolver>,
    pub sessions: Arc<SessionMap>,
}

impl AppState {
    /// Load configuration and build the record client and intent resolver.
    pub async fn init(overrides: &Overrides) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let mut config = load_config(&data_dir).await;
        overrides.apply(&mut config);

        let token = secret_from_env(&config.record_api.token_env);
        if token.is_none() {
            tracing::debug!(
                env = %config.record_api.token_env,
                "no record API token set, requests will be unauthenticated"
            );
        }
        let record_api = HttpRecordApi::new(&config.record_api, token)?;
        let resolver = build_resolver(&config.nlp, secret_from_env(&config.nlp.api_key_env));

        tracing::info!(
            data_dir = %data_dir.display(),
            record_api = %config.record_api.base_url,
            "application state initialized"
        );

        Ok(Self::from_parts(config, data_dir, record_api, resolver))
    }

    pub fn from_parts(
        config: AppConfig,
        data_dir: PathBuf,
        record_api: HttpRecordApi,
        resolver: IntentResolver,
    ) -> Self {
        Self {
            config: Arc::new(config),
            data_dir,
            record_api: Arc::new(record_api),
            resolver: Arc::new(resolver),
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Build a new chat session.
    ///
    /// `token` replaces the configured bearer token for this session only.
    pub fn new_session(&self, token: Option<SecretString>) -> Session {
        let api = match token {
            Some(token) => Arc::new(self.record_api.with_token(Some(token))),
            None => Arc::clone(&self.record_api),
        };
        let executor = CommandExecutor::new(api, self.config.record_api.page_size);
        ChatSession::new(ConversationEngine::new(executor, Arc::clone(&self.resolver)))
    }

    /// Create a session and register it for the REST API.
    pub fn open_session(&self, token: Option<SecretString>) -> (Uuid, Arc<Mutex<Session>>) {
        let session = self.new_session(token);
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id, Arc::clone(&handle));
        tracing::debug!(session.id = %id, "session opened");
        (id, handle)
    }

    pub fn session(&self, id: &Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn close_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }
}

#[cfg(test)]
impl AppState {
    /// State pointed at `base_url` with no token and no completion service.
    pub(crate) fn for_tests(base_url: &str) -> Self {
        let mut config = AppConfig::default();
        config.record_api.base_url = base_url.to_string();
        let record_api = HttpRecordApi::new(&config.record_api, None).unwrap();
        Self::from_parts(
            config,
            PathBuf::from("/tmp/curdmate-test"),
            record_api,
            IntentResolver::unconfigured("no key in tests"),
        )
    }
}
