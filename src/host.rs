use log::warn;

use crate::error::{HandleError, HostError};
use crate::handle::ContentHandle;

/// Entry points exported by the host module that the bridge calls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEntry {
    OpenJffFile,
    ReadMultipleRunInputs,
    TestXmlTree,
}

impl HostEntry {
    /// Name of the export on the host module's instance
    pub const fn export_name(self) -> &'static str {
        match self {
            HostEntry::OpenJffFile => "open_jff_file",
            HostEntry::ReadMultipleRunInputs => "read_multiple_run_inputs",
            HostEntry::TestXmlTree => "test_xmltree",
        }
    }
}

/// The host module as seen from the bridge: its entry-point table plus the
/// content-handle registry it owns.
pub trait HostModule {
    /// Register `text` with the host's registry
    fn wrap_content(&self, text: String) -> Result<ContentHandle, HostError>;

    /// Release a handle and return the text it named
    fn consume_content(&self, handle: ContentHandle) -> Result<String, HandleError>;

    /// Call `entry` with `handle`. Ownership passes to the host on success;
    /// on failure the implementation releases the handle itself.
    fn invoke(&self, entry: HostEntry, handle: ContentHandle) -> Result<(), HostError>;
}

/// Pass the raw id of `handle` to `call`. If the call fails the host never
/// took the handle, so it is released here.
pub fn hand_over<H, F>(host: &H, handle: ContentHandle, call: F) -> Result<(), HostError>
where
    H: HostModule + ?Sized,
    F: FnOnce(u32) -> Result<(), HostError>,
{
    match call(handle.id().0) {
        Ok(()) => {
            // The host owns it now
            handle.into_raw();
            Ok(())
        }
        Err(err) => {
            if let Err(release) = host.consume_content(handle) {
                warn!("could not release content after failed call: {}", release);
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    #[test]
    fn test_export_names() {
        assert_eq!(HostEntry::OpenJffFile.export_name(), "open_jff_file");
        assert_eq!(
            HostEntry::ReadMultipleRunInputs.export_name(),
            "read_multiple_run_inputs"
        );
        assert_eq!(HostEntry::TestXmlTree.export_name(), "test_xmltree");
    }

    #[test]
    fn test_hand_over_keeps_handle_live_on_success() {
        let host = RecordingHost::default();
        let handle = host.wrap("abc");
        let id = handle.id().0;

        let mut seen = None;
        hand_over(&host, handle, |raw| {
            seen = Some(raw);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, Some(id));
        assert_eq!(host.live(), 1);
        assert_eq!(host.released(), 0);
    }

    #[test]
    fn test_hand_over_releases_on_failure() {
        let host = RecordingHost::default();
        let handle = host.wrap("abc");

        let result = hand_over(&host, handle, |_| Err(HostError::Threw("RuntimeError: unreachable".to_string())));

        assert_eq!(result, Err(HostError::Threw("RuntimeError: unreachable".to_string())));
        assert_eq!(host.live(), 0);
        assert_eq!(host.released(), 1);
    }

    #[test]
    fn test_hand_over_reports_call_error_when_release_fails() {
        let host = RecordingHost::default();
        let handle = host.wrap("abc");

        // The callee released the buffer and then failed anyway
        let result = hand_over(&host, handle, |raw| {
            host.table.borrow_mut().take_raw(raw);
            Err(HostError::NotAttached)
        });

        assert_eq!(result, Err(HostError::NotAttached));
        assert_eq!(host.released(), 1);
    }
}
