// Dispatcher endpoints
//
// A single GET shape covers both telemetry ("diagnosis") and the action
// commands (open/close/stop); what differs is the retry handling. The
// upstream drops TLS connections often, so diagnosis degrades to an
// empty answer after exhaustion while commands surface a hard error.

use std::fmt;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::auth::AccessToken;
use crate::client::CloudClient;
use crate::error::{Error, FailureClass};
use crate::retry;

/// A dispatcher action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Telemetry fetch. Not a motion command.
    Diagnosis,
    Open,
    Close,
    Stop,
}

impl Action {
    /// The path segment used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnosis sample: position and velocity for the two gate engines.
///
/// Positions run 0-100; velocities are non-negative magnitudes with 0
/// meaning stationary. Absent or wrongly-typed fields decode as 0 so a
/// partial payload still produces a snapshot (the classifier downstream
/// is total and reports Unknown where the numbers make no sense).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(default, rename = "first_engine_pos_int", deserialize_with = "lenient_int")]
    pub first_engine_pos: i64,
    #[serde(default, rename = "second_engine_pos_int", deserialize_with = "lenient_int")]
    pub second_engine_pos: i64,
    #[serde(default, rename = "first_engine_vel_int", deserialize_with = "lenient_int")]
    pub first_engine_vel: i64,
    #[serde(default, rename = "second_engine_vel_int", deserialize_with = "lenient_int")]
    pub second_engine_vel: i64,
}

impl TelemetrySnapshot {
    pub fn new(pos1: i64, pos2: i64, vel1: i64, vel2: i64) -> Self {
        Self {
            first_engine_pos: pos1,
            second_engine_pos: pos2,
            first_engine_vel: vel1,
            second_engine_vel: vel2,
        }
    }
}

/// Accept any JSON value, reading non-integers as 0.
fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64().unwrap_or(0))
}

/// Acknowledgement payload of an action command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandAck {
    #[serde(default)]
    pub status: Option<String>,
}

impl CommandAck {
    /// The dispatcher reports completion with `status == "done"`.
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some("done")
    }
}

impl CloudClient {
    /// Fetch a telemetry snapshot.
    ///
    /// Timeouts exhaust into a terminal [`Error::Timeout`]; connection,
    /// TLS, and 5xx failures exhaust into `Ok(None)` ("could not
    /// determine state"), which the controller absorbs without touching
    /// the last known gate state. 4xx and malformed payloads are
    /// terminal on the first attempt.
    pub async fn diagnosis(
        &self,
        token: &AccessToken,
        device_id: &str,
    ) -> Result<Option<TelemetrySnapshot>, Error> {
        let result = self
            .execute_raw::<TelemetrySnapshot>(
                token,
                device_id,
                Action::Diagnosis,
                retry::diagnosis_classification,
            )
            .await;

        match result {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => match err.failure_class() {
                FailureClass::Connection | FailureClass::ServerError | FailureClass::Other => {
                    warn!(error = %err, "diagnosis exhausted retries, returning empty status");
                    Ok(None)
                }
                _ => Err(err),
            },
        }
    }

    /// Issue an action command (open/close/stop).
    ///
    /// Transport-level failures are retried; any HTTP error status is
    /// terminal immediately so a rejected command is never re-driven.
    pub async fn execute(
        &self,
        token: &AccessToken,
        device_id: &str,
        action: Action,
    ) -> Result<CommandAck, Error> {
        self.execute_raw(token, device_id, action, retry::command_classification)
            .await
    }

    async fn execute_raw<T: serde::de::DeserializeOwned>(
        &self,
        token: &AccessToken,
        device_id: &str,
        action: Action,
        classify: impl Fn(&Error) -> retry::Retry,
    ) -> Result<T, Error> {
        let url = self.execute_url(device_id, action.as_str())?;

        self.retry()
            .run(action.as_str(), classify, || {
                let url = url.clone();
                async move {
                debug!(%action, device_id, "dispatching");
                let resp = self
                    .http()
                    .get(url)
                    .bearer_auth(token.expose())
                    .send()
                    .await
                    .map_err(Error::Transport)?;
                Self::parse_json(resp).await
                }
            })
            .await
    }
}
