//! # Simulation Transport
//!
//! The seam between the sync engine and the simulation server.
//!
//! | Endpoint    | Response                                   |
//! |-------------|--------------------------------------------|
//! | `init`      | `{message, width, height}`                 |
//! | `getMap`    | `{map: {tiles, obstacles, roads, ...}}`    |
//! | `getAgents` | `{positions: [{id, x, y, z, direction}]}`  |
//! | `update`    | `{message, currentStep, running?}`         |
//!
//! [`HttpTransport`] talks to the real server; [`ScriptedTransport`] serves
//! canned payloads from memory.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use parkview_shared::{AgentRoster, InitResponse, MapLayout, MapResponse, StepResponse};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{TransportError, TransportResult};

/// Server endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Create the model
    Init,
    /// Static map
    Map,
    /// Agent roster
    Agents,
    /// Advance one step
    Step,
}

impl Endpoint {
    /// URL path relative to the server base.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Map => "getMap",
            Self::Agents => "getAgents",
            Self::Step => "update",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Asynchronous access to the simulation server.
///
/// Implementations must be shareable across the engine's runtime threads.
/// Each call is one request; the engine adds timeouts and retries.
pub trait SimulationTransport: Send + Sync + 'static {
    /// Creates (or resets) the model.
    fn init(&self) -> impl Future<Output = TransportResult<InitResponse>> + Send;

    /// Fetches the static map.
    fn map(&self) -> impl Future<Output = TransportResult<MapLayout>> + Send;

    /// Fetches the current agent roster.
    fn agents(&self) -> impl Future<Output = TransportResult<AgentRoster>> + Send;

    /// Advances the model one step.
    fn step(&self) -> impl Future<Output = TransportResult<StepResponse>> + Send;
}

// =============================================================================
// HTTP
// =============================================================================

/// JSON-over-HTTP transport (`GET <base><endpoint>`).
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a client for `base_url`. A missing trailing `/` is added.
    ///
    /// # Errors
    ///
    /// [`TransportError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Server base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> TransportResult<T> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let name = endpoint.path();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: name,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.request_error(name, e))?;
        debug!(endpoint = name, bytes = body.len(), "response received");

        serde_json::from_slice(&body).map_err(|source| TransportError::Decode {
            endpoint: name,
            source,
        })
    }

    fn request_error(&self, endpoint: &'static str, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                endpoint,
                after: self.timeout,
            }
        } else {
            TransportError::Http {
                endpoint,
                source: error,
            }
        }
    }
}

impl SimulationTransport for HttpTransport {
    async fn init(&self) -> TransportResult<InitResponse> {
        self.get_json(Endpoint::Init).await
    }

    async fn map(&self) -> TransportResult<MapLayout> {
        self.get_json::<MapResponse>(Endpoint::Map).await.map(|r| r.map)
    }

    async fn agents(&self) -> TransportResult<AgentRoster> {
        self.get_json(Endpoint::Agents).await
    }

    async fn step(&self) -> TransportResult<StepResponse> {
        self.get_json(Endpoint::Step).await
    }
}

// =============================================================================
// SCRIPTED
// =============================================================================

/// In-memory server.
///
/// Every `step` pops the next queued roster (the last one sticks) and bumps
/// the step counter. Failures can be injected per endpoint, and an optional
/// latency delays every answer.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

#[derive(Debug, Default)]
struct Script {
    init: InitResponse,
    map: MapLayout,
    current: AgentRoster,
    upcoming: VecDeque<AgentRoster>,
    step: u64,
    last_step: Option<u64>,
    failures: VecDeque<Endpoint>,
    latency: Option<Duration>,
    calls: Vec<Endpoint>,
}

impl ScriptedTransport {
    /// Server with the given grid size, map and initial roster.
    #[must_use]
    pub fn new(width: u32, height: u32, map: MapLayout, roster: AgentRoster) -> Self {
        Self {
            script: Mutex::new(Script {
                init: InitResponse {
                    message: format!("Model initialized ({width}x{height})"),
                    width,
                    height,
                },
                map,
                current: roster,
                ..Script::default()
            }),
        }
    }

    /// Queues the roster served after the next step.
    pub fn push_roster(&self, roster: AgentRoster) {
        self.script.lock().upcoming.push_back(roster);
    }

    /// The step that reports `running: false`.
    pub fn finish_after(&self, step: u64) {
        self.script.lock().last_step = Some(step);
    }

    /// Fails the next call to `endpoint`. Calls queue up.
    pub fn fail_next(&self, endpoint: Endpoint) {
        self.script.lock().failures.push_back(endpoint);
    }

    /// Delays every answer.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.script.lock().latency = latency;
    }

    /// Calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Endpoint> {
        self.script.lock().calls.clone()
    }

    /// Number of calls to `endpoint`.
    #[must_use]
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.script.lock().calls.iter().filter(|&&e| e == endpoint).count()
    }

    async fn answer<T>(&self, endpoint: Endpoint, respond: impl FnOnce(&mut Script) -> T) -> TransportResult<T> {
        let latency = self.script.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut script = self.script.lock();
        script.calls.push(endpoint);
        if let Some(pos) = script.failures.iter().position(|&e| e == endpoint) {
            script.failures.remove(pos);
            return Err(TransportError::Unavailable(format!("scripted failure on `{endpoint}`")));
        }
        Ok(respond(&mut script))
    }
}

impl SimulationTransport for ScriptedTransport {
    async fn init(&self) -> TransportResult<InitResponse> {
        self.answer(Endpoint::Init, |s| s.init.clone()).await
    }

    async fn map(&self) -> TransportResult<MapLayout> {
        self.answer(Endpoint::Map, |s| s.map.clone()).await
    }

    async fn agents(&self) -> TransportResult<AgentRoster> {
        self.answer(Endpoint::Agents, |s| s.current.clone()).await
    }

    async fn step(&self) -> TransportResult<StepResponse> {
        self.answer(Endpoint::Step, |s| {
            s.step += 1;
            if let Some(next) = s.upcoming.pop_front() {
                s.current = next;
            }
            StepResponse {
                message: format!("Model updated to step {}.", s.step),
                current_step: s.step,
                running: s.last_step.map_or(true, |last| s.step < last),
            }
        })
        .await
    }
}
