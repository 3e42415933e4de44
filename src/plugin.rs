//! The JS-facing side: a `FileBridge` the page creates and hands to the
//! host module's loader.
//!
//! ```js
//! const bridge = new FileBridge({ enable_save: true });
//! miniquad_add_plugin(bridge.plugin());
//! ```
//!
//! `register_plugin` fills `importObject.env` with the enabled capabilities
//! before the host module is instantiated. The loader calls `on_init` with no
//! arguments once `wasm_exports` is set; an exports object passed there
//! anyway is used instead of the global. Capabilities return to the host immediately and finish their
//! work on the event loop. Failures are logged, never reported back.

use std::rc::Rc;

use js_sys::{Object, Reflect};
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::VERSION;
use crate::bridge::FileDialogBridge;
use crate::browser::BrowserPlatform;
use crate::config::{BridgeConfig, Capability};
use crate::error::{OpenError, SaveError};
use crate::handle::ContentHandle;
use crate::host::HostModule;
use crate::js_interop::{ObjectTable, WasmHost};

/// Plugin name the host module's loader knows the bridge by
pub const PLUGIN_NAME: &str = "js";

type BrowserBridge = FileDialogBridge<BrowserPlatform, WasmHost>;

#[wasm_bindgen]
pub struct FileBridge {
    bridge: Rc<BrowserBridge>,
}

#[wasm_bindgen]
impl FileBridge {
    /// `config` is an optional object like `{ enable_save: true }`
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FileBridge, JsValue> {
        let config = BridgeConfig::from_js(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::build(config, WasmHost::new()))
    }

    /// Keep content handles in the loader's `js_object` table instead of the bridge's
    #[wasm_bindgen(js_name = withObjectTable)]
    pub fn with_object_table(objects: ObjectTable, config: JsValue) -> Result<FileBridge, JsValue> {
        let config = BridgeConfig::from_js(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::build(config, WasmHost::with_object_table(objects)))
    }

    pub fn register_plugin(&self, import_object: &Object) -> Result<(), JsValue> {
        register_into(&self.bridge, import_object)
    }

    pub fn on_init(&self, exports: JsValue) {
        attach_exports(&self.bridge, exports);
    }

    /// Descriptor for `miniquad_add_plugin`
    pub fn plugin(&self) -> Result<Object, JsValue> {
        let register = {
            let bridge = Rc::clone(&self.bridge);
            Closure::<dyn Fn(Object) -> Result<(), JsValue>>::new(move |import_object: Object| {
                register_into(&bridge, &import_object)
            })
            .into_js_value()
        };
        let on_init = {
            let bridge = Rc::clone(&self.bridge);
            Closure::<dyn Fn(JsValue)>::new(move |exports: JsValue| {
                attach_exports(&bridge, exports);
            })
            .into_js_value()
        };

        let descriptor = Object::new();
        Reflect::set(&descriptor, &JsValue::from_str("register_plugin"), &register)?;
        Reflect::set(&descriptor, &JsValue::from_str("on_init"), &on_init)?;
        Reflect::set(&descriptor, &JsValue::from_str("version"), &JsValue::from_str(VERSION))?;
        Reflect::set(&descriptor, &JsValue::from_str("name"), &JsValue::from_str(PLUGIN_NAME))?;
        Ok(descriptor)
    }

    /// Register text with the host's registry, for host-side glue that
    /// creates handles to pass to `save_jff_file` or `console_log`
    pub fn wrap_content(&self, text: String) -> Result<u32, JsValue> {
        self.bridge
            .host()
            .wrap_content(text)
            .map(ContentHandle::into_raw)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Release a handle the bridge forwarded and get its text back
    pub fn take_content(&self, id: u32) -> Option<String> {
        self.bridge
            .host()
            .consume_content(ContentHandle::from_raw(id))
            .ok()
    }

    /// Handles still held by the bridge; `undefined` when the loader owns them
    pub fn live_handles(&self) -> Option<u32> {
        self.bridge.host().live_handles().map(|live| live as u32)
    }

    /// Import names this bridge registers
    pub fn capabilities(&self) -> Vec<String> {
        self.bridge
            .config()
            .capabilities()
            .into_iter()
            .map(|capability| capability.name().to_string())
            .collect()
    }
}

impl FileBridge {
    fn build(config: BridgeConfig, host: WasmHost) -> Self {
        Self {
            bridge: Rc::new(FileDialogBridge::new(config, BrowserPlatform::new(), host)),
        }
    }
}

// `undefined` or anything but an object falls back to the loader's global
fn attach_exports(bridge: &BrowserBridge, exports: JsValue) {
    let exports = exports.dyn_into::<Object>().ok();
    let explicit = exports.is_some();
    bridge.host().attach(exports);
    if bridge.host().is_attached() {
        debug!("host module exports attached (explicit: {})", explicit);
    } else {
        warn!("on_init: no host module exports found");
    }
}

fn register_into(bridge: &Rc<BrowserBridge>, import_object: &Object) -> Result<(), JsValue> {
    let env_key = JsValue::from_str("env");
    let mut env = Reflect::get(import_object, &env_key)?;
    if !env.is_object() {
        env = Object::new().into();
        Reflect::set(import_object, &env_key, &env)?;
    }

    let capabilities = bridge.config().capabilities();
    for capability in &capabilities {
        Reflect::set(&env, &JsValue::from_str(capability.name()), &capability_fn(bridge, *capability))?;
    }

    info!(
        "registered {}",
        capabilities.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

// Build the JS function the host module imports for `capability`
fn capability_fn(bridge: &Rc<BrowserBridge>, capability: Capability) -> JsValue {
    let bridge = Rc::clone(bridge);
    match capability {
        Capability::ChooseJffFile => Closure::<dyn Fn()>::new(move || {
            let bridge = Rc::clone(&bridge);
            spawn_local(async move {
                report_open(capability, bridge.choose_jff_file().await);
            });
        })
        .into_js_value(),

        Capability::ChooseMultipleRunFile => Closure::<dyn Fn()>::new(move || {
            let bridge = Rc::clone(&bridge);
            spawn_local(async move {
                report_open(capability, bridge.choose_multiple_run_file().await);
            });
        })
        .into_js_value(),

        Capability::SaveJffFile => Closure::<dyn Fn(u32)>::new(move |id: u32| {
            let bridge = Rc::clone(&bridge);
            spawn_local(async move {
                report_save(bridge.save_jff_file(ContentHandle::from_raw(id)).await);
            });
        })
        .into_js_value(),

        Capability::ConsoleLog => Closure::<dyn Fn(u32)>::new(move |id: u32| {
            if let Err(err) = bridge.console_log(ContentHandle::from_raw(id)) {
                warn!("console_log: {}", err);
            }
        })
        .into_js_value(),
    }
}

fn report_open(capability: Capability, result: Result<(), OpenError>) {
    match result {
        Ok(()) => debug!("{}: forwarded to host", capability.name()),
        Err(err) if err.is_cancel() => debug!("{}: {}", capability.name(), err),
        Err(err) => warn!("{}: {}", capability.name(), err),
    }
}

fn report_save(result: Result<(), SaveError>) {
    let name = Capability::SaveJffFile.name();
    match result {
        Ok(()) => debug!("{}: saved", name),
        Err(err) if err.is_cancel() => debug!("{}: {}", name, err),
        Err(err) => warn!("{}: {}", name, err),
    }
}
