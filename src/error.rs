use thiserror::Error;

use crate::handle::HandleId;

/// Failures of the host's content-handle registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("content handle {0} is not registered (never created or already released)")]
    Unknown(HandleId),

    #[error("content handle {0} does not hold text")]
    NotText(HandleId),
}

/// Failures while calling into the host module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host module exports are not attached yet")]
    NotAttached,

    #[error("host module does not export `{0}`")]
    MissingExport(&'static str),

    #[error("host module threw: {0}")]
    Threw(String),

    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Why an open-file interaction did not reach the host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    #[error("no file was selected")]
    Cancelled,

    #[error("this operation is disabled in the bridge configuration")]
    Disabled,

    #[error("failed to read the selected file: {0}")]
    Read(String),

    #[error("the selected file is not valid UTF-8 text")]
    NotUtf8,

    #[error(transparent)]
    Host(#[from] HostError),
}

impl OpenError {
    /// The user dismissed the dialog; nothing went wrong
    pub fn is_cancel(&self) -> bool {
        matches!(self, OpenError::Cancelled)
    }
}

/// Why a save did not write anything
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("the save dialog was dismissed")]
    Cancelled,

    #[error("writing the file failed: {0}")]
    WriteFailed(String),

    #[error("saving is not supported on this platform")]
    Unsupported,

    #[error("saving is disabled in the bridge configuration")]
    Disabled,

    #[error(transparent)]
    Handle(#[from] HandleError),
}

impl SaveError {
    pub fn is_cancel(&self) -> bool {
        matches!(self, SaveError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bridge configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid bridge configuration object: {0}")]
    JsValue(String),
}
