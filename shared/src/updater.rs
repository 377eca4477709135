// HTTP-based update checker against GitHub releases (platform-agnostic)
//
// Status flow: Idle -> Checking -> UpToDate | UpdateAvailable | Failed.
// A check may start from any state, including Checking. Every check gets a
// generation number when it starts; a result is applied only if its number is
// still the latest, so a slow response can never overwrite a newer one.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::version;

/// The latest published release, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Normalized version ("1.1.0"), or the raw tag if it has no digits.
    pub version: String,
    /// Tag exactly as published ("v1.1.0").
    pub tag: String,
    pub title: Option<String>,
    pub html_url: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UpdateStatus {
    #[default]
    Idle,
    Checking,
    UpToDate,
    UpdateAvailable(ReleaseInfo),
    Failed(String),
}

impl UpdateStatus {
    pub fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }
}

/// `GET /repos/{owner}/{repo}/releases/latest` payload (only what we use).
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
    html_url: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

/// Decode a release object.
pub fn decode_release(body: &str) -> Result<ReleaseInfo, UpdateError> {
    let release: GitHubRelease =
        serde_json::from_str(body).map_err(|source| UpdateError::Decode { source })?;

    let version = version::normalize(&release.tag_name).unwrap_or_else(|| release.tag_name.clone());
    Ok(ReleaseInfo {
        version,
        tag: release.tag_name,
        title: release.name.filter(|n| !n.trim().is_empty()),
        html_url: release.html_url,
        published_at: release.published_at,
    })
}

/// Something that can tell us about the latest release.
pub trait ReleaseSource: Send + Sync {
    /// Blocking fetch. Called from a background thread.
    fn fetch_latest(&self) -> Result<ReleaseInfo, UpdateError>;
}

/// GitHub REST API client.
pub struct GitHubReleaseSource {
    agent: ureq::Agent,
    url: String,
    user_agent: String,
    accept: String,
}

impl GitHubReleaseSource {
    pub fn new(config: &UpdateConfig, current_version: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            url: config.latest_release_url(),
            user_agent: config.user_agent(current_version),
            accept: config.accept.clone(),
        }
    }
}

impl ReleaseSource for GitHubReleaseSource {
    fn fetch_latest(&self) -> Result<ReleaseInfo, UpdateError> {
        let response = match self
            .agent
            .get(&self.url)
            .set("User-Agent", &self.user_agent)
            .set("Accept", &self.accept)
            .call()
        {
            Ok(r) => r,
            Err(ureq::Error::Status(code, _)) => return Err(UpdateError::from_status(code)),
            Err(e) => {
                return Err(UpdateError::Transport {
                    message: e.kind().to_string(),
                })
            }
        };

        let code = response.status();
        if !(200..300).contains(&code) {
            return Err(UpdateError::from_status(code));
        }

        let body = response
            .into_string()
            .map_err(|source| UpdateError::Read { source })?;
        decode_release(&body)
    }
}

struct CheckerState {
    status: UpdateStatus,
    /// Generation of the most recently started check.
    generation: u64,
    /// Pending one-shot "show update prompt" signal.
    prompt: Option<ReleaseInfo>,
    listeners: Vec<Sender<UpdateStatus>>,
}

impl CheckerState {
    fn set_status(&mut self, status: UpdateStatus) {
        self.status = status;
        let snapshot = &self.status;
        self.listeners.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

struct Shared {
    current_version: String,
    source: Box<dyn ReleaseSource>,
    state: Mutex<CheckerState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CheckerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.set_status(UpdateStatus::Checking);
        tracing::debug!(generation = state.generation, "Checking for updates");
        state.generation
    }

    fn run(&self, generation: u64, announce: bool) -> UpdateStatus {
        let outcome = self.source.fetch_latest();
        self.finish(generation, outcome, announce)
    }

    fn finish(
        &self,
        generation: u64,
        outcome: Result<ReleaseInfo, UpdateError>,
        announce: bool,
    ) -> UpdateStatus {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(
                generation,
                latest = state.generation,
                "Discarding stale update check result"
            );
            return state.status.clone();
        }

        let status = match outcome {
            Ok(release) if version::is_newer(&release.version, &self.current_version) => {
                tracing::info!(
                    current = %self.current_version,
                    latest = %release.version,
                    "Update available"
                );
                // A silent check never withdraws a prompt still waiting to be shown.
                if announce {
                    state.prompt = Some(release.clone());
                }
                UpdateStatus::UpdateAvailable(release)
            }
            Ok(release) => {
                tracing::info!(
                    current = %self.current_version,
                    latest = %release.version,
                    "Up to date"
                );
                state.prompt = None;
                UpdateStatus::UpToDate
            }
            Err(e) => {
                tracing::warn!("Update check failed: {:?}", e);
                state.prompt = None;
                UpdateStatus::Failed(e.to_string())
            }
        };
        state.set_status(status.clone());
        status
    }
}

/// Owns the update status and runs checks against a [`ReleaseSource`].
///
/// Dropping the checker abandons any check still in flight: its result is
/// neither applied nor broadcast.
pub struct UpdateChecker {
    shared: Arc<Shared>,
}

impl UpdateChecker {
    pub fn new(current_version: impl Into<String>, source: impl ReleaseSource + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                current_version: current_version.into(),
                source: Box::new(source),
                state: Mutex::new(CheckerState {
                    status: UpdateStatus::Idle,
                    generation: 0,
                    prompt: None,
                    listeners: Vec::new(),
                }),
            }),
        }
    }

    /// Checker backed by the GitHub releases API.
    pub fn github(config: &UpdateConfig, current_version: impl Into<String>) -> Self {
        let current_version = current_version.into();
        let source = GitHubReleaseSource::new(config, &current_version);
        Self::new(current_version, source)
    }

    pub fn current_version(&self) -> &str {
        &self.shared.current_version
    }

    pub fn status(&self) -> UpdateStatus {
        self.shared.lock().status.clone()
    }

    /// Receive every status change from now on.
    pub fn subscribe(&self) -> Receiver<UpdateStatus> {
        let (tx, rx) = mpsc::channel();
        self.shared.lock().listeners.push(tx);
        rx
    }

    /// Take the pending update prompt, if any. Returns `Some` at most once per
    /// check that found a new version with `announce` set.
    pub fn take_update_prompt(&self) -> Option<ReleaseInfo> {
        self.shared.lock().prompt.take()
    }

    /// Start a check on a background thread. The status moves to `Checking`
    /// before this returns.
    pub fn check_for_updates(&self, announce: bool) -> JoinHandle<()> {
        let generation = self.shared.begin();
        let shared = Arc::clone(&self.shared);
        thread::spawn(move || {
            shared.run(generation, announce);
        })
    }

    /// Run a check on the calling thread and return the resulting status
    /// (which may belong to a newer check if one started meanwhile).
    pub fn check_now(&self, announce: bool) -> UpdateStatus {
        let generation = self.shared.begin();
        self.shared.run(generation, announce)
    }
}

impl Drop for UpdateChecker {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.generation += 1;
        state.listeners.clear();
        state.prompt = None;
    }
}
