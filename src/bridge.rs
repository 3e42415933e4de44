//! The file dialog bridge: the four operations the host module can ask for.
//!
//! Every operation is one linear sequence with a single wait on the user.
//! Results come back as `Result`s so callers can log them; the import table
//! in `plugin.rs` never reports them to the host.

use log::debug;

use crate::config::BridgeConfig;
use crate::error::{HandleError, OpenError, SaveError};
use crate::handle::ContentHandle;
use crate::host::{HostEntry, HostModule};
use crate::platform::{DialogPlatform, FileFilter, SavePicker, TEXT_MIME};

pub struct FileDialogBridge<P, H> {
    config: BridgeConfig,
    platform: P,
    host: H,
}

impl<P: DialogPlatform, H: HostModule> FileDialogBridge<P, H> {
    pub fn new(config: BridgeConfig, platform: P, host: H) -> Self {
        Self {
            config,
            platform,
            host,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Let the user pick a `.jff` file and hand its text to `open_jff_file`
    pub async fn choose_jff_file(&self) -> Result<(), OpenError> {
        if !self.config.enable_jff_open {
            return Err(OpenError::Disabled);
        }
        self.open_and_forward(&FileFilter::jff(), HostEntry::OpenJffFile)
            .await
    }

    /// Let the user pick any file and hand its text to the configured
    /// multi-run entry point
    pub async fn choose_multiple_run_file(&self) -> Result<(), OpenError> {
        let entry = self.config.multi_run_target.entry();
        self.open_and_forward(&FileFilter::any(), entry).await
    }

    async fn open_and_forward(&self, filter: &FileFilter, entry: HostEntry) -> Result<(), OpenError> {
        let file = self
            .platform
            .pick_file(filter)
            .await
            .ok_or(OpenError::Cancelled)?;
        let name = self.platform.file_name(&file);
        let text = self.platform.read_text(file).await?;

        debug!(
            "read {} bytes from {}, forwarding to {}",
            text.len(),
            name,
            entry.export_name()
        );
        let handle = self.host.wrap_content(text)?;
        self.host.invoke(entry, handle)?;
        Ok(())
    }

    /// Write the text behind `handle` to disk.
    ///
    /// The handle is released before anything else happens, so it is
    /// released exactly once however the save ends. With a native save
    /// picker the user chooses the location; without one the text is
    /// offered as a download under the configured file name.
    pub async fn save_jff_file(&self, handle: ContentHandle) -> Result<(), SaveError> {
        let text = self.host.consume_content(handle)?;
        if !self.config.enable_save {
            return Err(SaveError::Disabled);
        }

        let name = self.config.save_name();
        if self.platform.has_save_picker() {
            self.platform
                .save_with_picker(&SavePicker::jff(name), &text)
                .await
        } else {
            debug!("no native save picker, downloading {}", name);
            self.platform.download(&name, TEXT_MIME, &text)
        }
    }

    /// Print the text behind `handle` to the console, releasing it
    pub fn console_log(&self, handle: ContentHandle) -> Result<(), HandleError> {
        let text = self.host.consume_content(handle)?;
        if self.config.enable_console_log {
            self.platform.console_log(&text);
        }
        Ok(())
    }
}
