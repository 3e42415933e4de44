//! Scripted platform and recording host used by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::error::{HandleError, HostError, OpenError, SaveError};
use crate::handle::{ContentHandle, HandleId, HandleTable};
use crate::host::{HostEntry, HostModule, hand_over};
use crate::platform::{
    DialogPlatform, FileFilter, SavePicker, WritableStream, picker_rejection, write_and_close,
};

#[derive(Debug, Clone)]
pub struct ScriptedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub unreadable: bool,
}

impl ScriptedFile {
    pub fn text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            bytes: text.as_bytes().to_vec(),
            unreadable: false,
        }
    }
}

/// What the native save picker does when shown
#[derive(Debug, Clone)]
pub enum PickerScript {
    Confirm,
    /// Rejects with `AbortError`
    Cancel,
    /// Rejects with a `DOMException` of this name
    Reject(String),
}

/// Stream that records writes and closes, optionally failing either
#[derive(Default)]
pub struct ScriptedWritable {
    pub fail_write: Option<String>,
    pub fail_close: Option<String>,
    pub written: RefCell<Vec<String>>,
    pub closed: Cell<usize>,
}

impl WritableStream for ScriptedWritable {
    async fn write(&self, text: &str) -> Result<(), SaveError> {
        if let Some(reason) = &self.fail_write {
            return Err(SaveError::WriteFailed(reason.clone()));
        }
        self.written.borrow_mut().push(text.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), SaveError> {
        self.closed.set(self.closed.get() + 1);
        match &self.fail_close {
            Some(reason) => Err(SaveError::WriteFailed(reason.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub text: String,
}

/// Each `pick_file` call pops the next scripted answer; `None` is a cancel
#[derive(Default)]
pub struct ScriptedPlatform {
    pub picks: RefCell<VecDeque<Option<ScriptedFile>>>,
    pub filters: RefCell<Vec<FileFilter>>,
    pub save_picker: Option<PickerScript>,
    pub download_fails: bool,
    pub pickers_shown: RefCell<Vec<SavePicker>>,
    pub stream: ScriptedWritable,
    pub downloads: RefCell<Vec<Download>>,
    pub console: RefCell<Vec<String>>,
}

impl ScriptedPlatform {
    pub fn with_picks(picks: Vec<Option<ScriptedFile>>) -> Self {
        Self {
            picks: RefCell::new(picks.into()),
            ..Self::default()
        }
    }

    pub fn with_save_picker(script: PickerScript) -> Self {
        Self {
            save_picker: Some(script),
            ..Self::default()
        }
    }
}

impl DialogPlatform for ScriptedPlatform {
    type File = ScriptedFile;

    async fn pick_file(&self, filter: &FileFilter) -> Option<ScriptedFile> {
        self.filters.borrow_mut().push(filter.clone());
        self.picks.borrow_mut().pop_front().flatten()
    }

    fn file_name(&self, file: &ScriptedFile) -> String {
        file.name.clone()
    }

    async fn read_text(&self, file: ScriptedFile) -> Result<String, OpenError> {
        if file.unreadable {
            return Err(OpenError::Read("NotReadableError".to_string()));
        }
        String::from_utf8(file.bytes).map_err(|_| OpenError::NotUtf8)
    }

    fn has_save_picker(&self) -> bool {
        self.save_picker.is_some()
    }

    async fn save_with_picker(&self, picker: &SavePicker, text: &str) -> Result<(), SaveError> {
        self.pickers_shown.borrow_mut().push(picker.clone());
        match &self.save_picker {
            Some(PickerScript::Confirm) => write_and_close(&self.stream, text).await,
            Some(PickerScript::Cancel) => Err(picker_rejection(
                Some("AbortError"),
                "The user aborted a request.".to_string(),
            )),
            Some(PickerScript::Reject(name)) => Err(picker_rejection(Some(name), name.clone())),
            None => Err(SaveError::Unsupported),
        }
    }

    fn download(&self, file_name: &str, mime: &str, text: &str) -> Result<(), SaveError> {
        if self.download_fails {
            return Err(SaveError::WriteFailed("blob".to_string()));
        }
        self.downloads.borrow_mut().push(Download {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn console_log(&self, text: &str) {
        self.console.borrow_mut().push(text.to_string());
    }
}

/// Host that reads every forwarded handle and remembers the call
#[derive(Default)]
pub struct RecordingHost {
    pub table: RefCell<HandleTable>,
    pub calls: RefCell<Vec<(HostEntry, String)>>,
    pub missing: Option<HostEntry>,
}

impl RecordingHost {
    pub fn wrap(&self, text: &str) -> ContentHandle {
        self.table.borrow_mut().wrap(text.to_string())
    }

    pub fn released(&self) -> usize {
        self.table.borrow().released()
    }

    pub fn live(&self) -> usize {
        self.table.borrow().live()
    }
}

impl HostModule for RecordingHost {
    fn wrap_content(&self, text: String) -> Result<ContentHandle, HostError> {
        Ok(self.table.borrow_mut().wrap(text))
    }

    fn consume_content(&self, handle: ContentHandle) -> Result<String, HandleError> {
        self.table.borrow_mut().consume(handle)
    }

    fn invoke(&self, entry: HostEntry, handle: ContentHandle) -> Result<(), HostError> {
        hand_over(self, handle, |raw| {
            if self.missing == Some(entry) {
                return Err(HostError::MissingExport(entry.export_name()));
            }
            let text = self
                .table
                .borrow_mut()
                .take_raw(raw)
                .ok_or(HandleError::Unknown(HandleId(raw)))?;
            self.calls.borrow_mut().push((entry, text));
            Ok(())
        })
    }
}
