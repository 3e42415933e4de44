//! The seam between the bridge and whatever shows file dialogs.
//!
//! `BrowserPlatform` in `browser.rs` is the real implementation. The
//! `HeadlessPlatform` here stands in where there is no browser: every dialog
//! comes back empty, the same way the editor's native build stubs the
//! dialog imports out.

use std::collections::BTreeMap;
use std::convert::Infallible;

use log::info;
use serde::Serialize;

use crate::config::JFF_EXTENSION;
use crate::error::{OpenError, SaveError};

/// MIME type used for saved and downloaded content
pub const TEXT_MIME: &str = "text/plain";

/// Restricts what a file-choose dialog offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    /// Value for the input's `accept` attribute, `None` for any file
    pub accept: Option<String>,
}

impl FileFilter {
    pub fn any() -> Self {
        Self { accept: None }
    }

    pub fn extension(extension: &str) -> Self {
        Self {
            accept: Some(extension.to_string()),
        }
    }

    pub fn jff() -> Self {
        Self::extension(JFF_EXTENSION)
    }
}

/// Options for a native "save as" picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePicker {
    pub description: String,
    pub mime: String,
    pub extension: String,
    pub suggested_name: String,
}

impl SavePicker {
    pub fn jff(suggested_name: impl Into<String>) -> Self {
        Self {
            description: "JFF file".to_string(),
            mime: TEXT_MIME.to_string(),
            extension: JFF_EXTENSION.to_string(),
            suggested_name: suggested_name.into(),
        }
    }

    /// Options object for `showSaveFilePicker`
    pub fn options(&self) -> SavePickerOptions {
        let mut accept = BTreeMap::new();
        accept.insert(self.mime.clone(), vec![self.extension.clone()]);
        SavePickerOptions {
            suggested_name: self.suggested_name.clone(),
            types: vec![SavePickerType {
                description: self.description.clone(),
                accept,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePickerOptions {
    pub suggested_name: String,
    pub types: Vec<SavePickerType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavePickerType {
    pub description: String,
    /// MIME type to accepted extensions
    pub accept: BTreeMap<String, Vec<String>>,
}

/// Classify a rejected save picker by its `DOMException` name.
/// `AbortError` is the user dismissing the dialog.
pub fn picker_rejection(name: Option<&str>, detail: String) -> SaveError {
    match name {
        Some("AbortError") => SaveError::Cancelled,
        _ => SaveError::WriteFailed(detail),
    }
}

/// A stream opened on the file the user chose to save to
#[allow(async_fn_in_trait)]
pub trait WritableStream {
    async fn write(&self, text: &str) -> Result<(), SaveError>;

    async fn close(&self) -> Result<(), SaveError>;
}

/// Write `text` and close the stream, also when the write failed.
/// The write error wins over a close error.
pub async fn write_and_close<W: WritableStream>(stream: &W, text: &str) -> Result<(), SaveError> {
    let written = stream.write(text).await;
    let closed = stream.close().await;
    written.and(closed)
}

#[allow(async_fn_in_trait)]
pub trait DialogPlatform {
    /// A file the user picked, valid until it has been read
    type File;

    /// Show a file-choose dialog. `None` means the user cancelled.
    async fn pick_file(&self, filter: &FileFilter) -> Option<Self::File>;

    fn file_name(&self, file: &Self::File) -> String;

    /// Read the whole file as UTF-8 text
    async fn read_text(&self, file: Self::File) -> Result<String, OpenError>;

    /// Whether a native "save as" picker is available
    fn has_save_picker(&self) -> bool;

    /// Ask for a location with the native picker and write `text` there
    async fn save_with_picker(&self, picker: &SavePicker, text: &str) -> Result<(), SaveError>;

    /// Offer `text` as a client-side download
    fn download(&self, file_name: &str, mime: &str, text: &str) -> Result<(), SaveError>;

    fn console_log(&self, text: &str);
}

/// Platform without any dialogs
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPlatform;

impl DialogPlatform for HeadlessPlatform {
    type File = Infallible;

    async fn pick_file(&self, _filter: &FileFilter) -> Option<Infallible> {
        None
    }

    fn file_name(&self, file: &Infallible) -> String {
        match *file {}
    }

    async fn read_text(&self, file: Infallible) -> Result<String, OpenError> {
        match file {}
    }

    fn has_save_picker(&self) -> bool {
        false
    }

    async fn save_with_picker(&self, _picker: &SavePicker, _text: &str) -> Result<(), SaveError> {
        Err(SaveError::Unsupported)
    }

    fn download(&self, _file_name: &str, _mime: &str, _text: &str) -> Result<(), SaveError> {
        Err(SaveError::Unsupported)
    }

    fn console_log(&self, text: &str) {
        info!(target: "console", "{}", text);
    }
}
