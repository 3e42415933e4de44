use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::ConfigError;
use crate::host::HostEntry;

/// Extension of the editor's saved-automaton files
pub const JFF_EXTENSION: &str = ".jff";

/// File name used for the download fallback when nothing else is configured
pub const DEFAULT_SAVE_NAME: &str = "automaton.jff";

/// Where `choose_multiple_run_file` forwards the file it read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiRunTarget {
    /// `read_multiple_run_inputs`, the production wiring
    #[default]
    ReadInputs,
    /// `test_xmltree`, the diagnostic wiring
    TestXmlTree,
}

impl MultiRunTarget {
    pub fn entry(self) -> HostEntry {
        match self {
            MultiRunTarget::ReadInputs => HostEntry::ReadMultipleRunInputs,
            MultiRunTarget::TestXmlTree => HostEntry::TestXmlTree,
        }
    }
}

/// Functions the bridge can place into the host's import namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ChooseJffFile,
    ChooseMultipleRunFile,
    SaveJffFile,
    ConsoleLog,
}

impl Capability {
    /// Import name the host module links against
    pub const fn name(self) -> &'static str {
        match self {
            Capability::ChooseJffFile => "choose_jff_file",
            Capability::ChooseMultipleRunFile => "choose_multiple_run_file",
            Capability::SaveJffFile => "save_jff_file",
            Capability::ConsoleLog => "console_log",
        }
    }
}

/// Which capabilities a deployment exposes and how they are wired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enable_jff_open: bool,
    pub enable_save: bool,
    pub multi_run_target: MultiRunTarget,
    pub enable_console_log: bool,
    pub default_save_name: String,
}

impl BridgeConfig {
    /// Open `.jff` files and load multi-run inputs
    pub fn picker() -> Self {
        Self {
            enable_jff_open: true,
            enable_save: false,
            multi_run_target: MultiRunTarget::ReadInputs,
            enable_console_log: false,
            default_save_name: DEFAULT_SAVE_NAME.to_string(),
        }
    }

    /// The picker plus saving `.jff` files
    pub fn editor() -> Self {
        Self {
            enable_save: true,
            ..Self::picker()
        }
    }

    /// Multi-run files go to `test_xmltree`, console logging on, no `.jff` dialogs
    pub fn diagnostic() -> Self {
        Self {
            enable_jff_open: false,
            enable_save: false,
            multi_run_target: MultiRunTarget::TestXmlTree,
            enable_console_log: true,
            default_save_name: DEFAULT_SAVE_NAME.to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration object passed from JS; `undefined` and `null`
    /// mean the default configuration.
    pub fn from_js(value: JsValue) -> Result<Self, ConfigError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value).map_err(|e| ConfigError::JsValue(e.to_string()))
    }

    /// File name offered by the save dialog and used for downloads
    pub fn save_name(&self) -> String {
        let name = self.default_save_name.trim();
        if name.is_empty() {
            DEFAULT_SAVE_NAME.to_string()
        } else if name.to_ascii_lowercase().ends_with(JFF_EXTENSION) {
            name.to_string()
        } else {
            format!("{}{}", name, JFF_EXTENSION)
        }
    }

    /// Capabilities to register, in registration order
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = Vec::new();
        if self.enable_jff_open {
            capabilities.push(Capability::ChooseJffFile);
        }
        capabilities.push(Capability::ChooseMultipleRunFile);
        if self.enable_save {
            capabilities.push(Capability::SaveJffFile);
        }
        if self.enable_console_log {
            capabilities.push(Capability::ConsoleLog);
        }
        capabilities
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::picker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(config: &BridgeConfig) -> Vec<&'static str> {
        config.capabilities().into_iter().map(Capability::name).collect()
    }

    #[test]
    fn test_presets_match_deployments() {
        assert_eq!(
            names(&BridgeConfig::picker()),
            vec!["choose_jff_file", "choose_multiple_run_file"]
        );
        assert_eq!(
            names(&BridgeConfig::editor()),
            vec!["choose_jff_file", "choose_multiple_run_file", "save_jff_file"]
        );
        assert_eq!(
            names(&BridgeConfig::diagnostic()),
            vec!["choose_multiple_run_file", "console_log"]
        );
    }

    #[test]
    fn test_multi_run_target_entry() {
        assert_eq!(
            BridgeConfig::picker().multi_run_target.entry(),
            HostEntry::ReadMultipleRunInputs
        );
        assert_eq!(
            BridgeConfig::diagnostic().multi_run_target.entry(),
            HostEntry::TestXmlTree
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BridgeConfig::from_json(r#"{ "enable_save": true }"#).unwrap();
        assert_eq!(config, BridgeConfig::editor());

        let config = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_multi_run_target_names() {
        let config =
            BridgeConfig::from_json(r#"{ "multi_run_target": "test_xml_tree" }"#).unwrap();
        assert_eq!(config.multi_run_target, MultiRunTarget::TestXmlTree);

        assert!(BridgeConfig::from_json(r#"{ "multi_run_target": "both" }"#).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = BridgeConfig::from_json("{ enable_save").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_save_name() {
        let mut config = BridgeConfig::editor();
        assert_eq!(config.save_name(), "automaton.jff");

        config.default_save_name = "dfa".to_string();
        assert_eq!(config.save_name(), "dfa.jff");

        config.default_save_name = "NFA.JFF".to_string();
        assert_eq!(config.save_name(), "NFA.JFF");

        config.default_save_name = "   ".to_string();
        assert_eq!(config.save_name(), DEFAULT_SAVE_NAME);
    }
}
