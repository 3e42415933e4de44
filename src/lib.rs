use wasm_bindgen::prelude::*;

pub mod bridge;
pub mod browser;
pub mod config;
pub mod error;
pub mod handle;
pub mod host;
pub mod js_interop;
pub mod logging;
pub mod platform;
pub mod plugin;

#[cfg(test)]
mod testing;

pub use bridge::FileDialogBridge;
pub use config::{BridgeConfig, Capability, MultiRunTarget};
pub use error::{ConfigError, HandleError, HostError, OpenError, SaveError};
pub use handle::{ContentHandle, HandleId, HandleTable};
pub use host::{HostEntry, HostModule};
pub use platform::{DialogPlatform, FileFilter, HeadlessPlatform, SavePicker};
pub use plugin::FileBridge;

/// Version reported to the host module's loader
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Send log output to the browser console, e.g. `init_logging("debug")`
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    logging::init(logging::parse_level(level));
}
