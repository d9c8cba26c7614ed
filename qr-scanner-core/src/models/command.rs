use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::device::CameraFacing;
use super::error::ScannerError;
use super::status::StatusSnapshot;

/// Host-provided identifier that keys a command to its single response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier for hosts that do not supply their own.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Commands accepted from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prepare,
    Scan,
    CancelScan,
    Show,
    Hide,
    PausePreview,
    ResumePreview,
    UseCamera(CameraFacing),
    EnableLight,
    DisableLight,
    GetStatus,
    Destroy,
    OpenSettings,
}

impl Command {
    /// Parses a bridge action name and its JSON argument array.
    pub fn from_action(action: &str, args: &Value) -> Result<Self, ScannerError> {
        let command = match action {
            "prepare" => Self::Prepare,
            "scan" => Self::Scan,
            "cancelScan" => Self::CancelScan,
            "show" => Self::Show,
            "hide" => Self::Hide,
            "pausePreview" => Self::PausePreview,
            "resumePreview" => Self::ResumePreview,
            "useCamera" => {
                let facing = args
                    .get(0)
                    .and_then(Value::as_u64)
                    .and_then(CameraFacing::from_index);
                match facing {
                    Some(facing) => Self::UseCamera(facing),
                    None => {
                        log::warn!("useCamera called with invalid arguments: {}", args);
                        return Err(ScannerError::UnexpectedError);
                    }
                }
            }
            "enableLight" => Self::EnableLight,
            "disableLight" => Self::DisableLight,
            "getStatus" => Self::GetStatus,
            "destroy" => Self::Destroy,
            "openSettings" => Self::OpenSettings,
            other => {
                log::warn!("unknown scanner action: {}", other);
                return Err(ScannerError::UnexpectedError);
            }
        };
        Ok(command)
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Scan => "scan",
            Self::CancelScan => "cancelScan",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::PausePreview => "pausePreview",
            Self::ResumePreview => "resumePreview",
            Self::UseCamera(_) => "useCamera",
            Self::EnableLight => "enableLight",
            Self::DisableLight => "disableLight",
            Self::GetStatus => "getStatus",
            Self::Destroy => "destroy",
            Self::OpenSettings => "openSettings",
        }
    }

    /// Whether the command needs a running session before it can act.
    pub fn needs_session(&self) -> bool {
        matches!(
            self,
            Self::Prepare | Self::Scan | Self::UseCamera(_) | Self::EnableLight | Self::DisableLight
        )
    }
}

/// Successful result payload of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Status(StatusSnapshot),
    Decoded(String),
}

/// The one and only response to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub request_id: RequestId,
    pub outcome: Result<ResponsePayload, ScannerError>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<ScannerError> {
        self.outcome.as_ref().err().copied()
    }

    pub fn status(&self) -> Option<&StatusSnapshot> {
        match &self.outcome {
            Ok(ResponsePayload::Status(status)) => Some(status),
            _ => None,
        }
    }

    pub fn decoded(&self) -> Option<&str> {
        match &self.outcome {
            Ok(ResponsePayload::Decoded(value)) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Response", 3)?;
        s.serialize_field("requestId", &self.request_id)?;
        match &self.outcome {
            Ok(payload) => {
                s.serialize_field("success", &true)?;
                s.serialize_field("payload", payload)?;
            }
            Err(error) => {
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
            }
        }
        s.end()
    }
}
