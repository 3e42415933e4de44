use std::cell::RefCell;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::{HandleError, HostError};
use crate::handle::{ContentHandle, HandleTable};
use crate::host::{HostEntry, HostModule, hand_over};

/// Global the miniquad loader stores the instance exports in
pub const GLOBAL_EXPORTS: &str = "wasm_exports";

// The loader's own object table (sapp-jsutils style), passed in by the page
#[wasm_bindgen]
extern "C" {
    pub type ObjectTable;

    #[wasm_bindgen(method, catch, js_name = js_object)]
    fn js_object(this: &ObjectTable, text: &str) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = consume_js_object)]
    fn consume_js_object(this: &ObjectTable, id: u32) -> Result<JsValue, JsValue>;
}

// Best-effort text for a thrown JS value
pub(crate) fn describe_js_error(error: &JsValue) -> String {
    if let Some(text) = error.as_string() {
        return text;
    }
    let field = |name: &str| {
        Reflect::get(error, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.as_string())
    };
    match (field("name"), field("message")) {
        (Some(name), Some(message)) => format!("{}: {}", name, message),
        (None, Some(message)) => message,
        (Some(name), None) => name,
        (None, None) => format!("{:?}", error),
    }
}

// Where content handles live
enum Objects {
    Bridge(RefCell<HandleTable>),
    Loader(ObjectTable),
}

/// A running host module, reached through its JS exports object.
///
/// Exports passed to `attach` take precedence. Without them every call looks
/// up `globalThis.wasm_exports`, which the loader sets before `on_init`.
pub struct WasmHost {
    exports: RefCell<Option<Object>>,
    objects: Objects,
}

impl WasmHost {
    /// Handles are kept in a table owned by the bridge
    pub fn new() -> Self {
        Self {
            exports: RefCell::new(None),
            objects: Objects::Bridge(RefCell::new(HandleTable::new())),
        }
    }

    /// Handles are kept in the loader's `js_object` / `consume_js_object` table
    pub fn with_object_table(table: ObjectTable) -> Self {
        Self {
            exports: RefCell::new(None),
            objects: Objects::Loader(table),
        }
    }

    /// Attach the instance exports once the host module is instantiated.
    /// `None` keeps using the loader's global.
    pub fn attach(&self, exports: Option<Object>) {
        *self.exports.borrow_mut() = exports;
    }

    /// Whether an exports object can be found, attached or global
    pub fn is_attached(&self) -> bool {
        self.exports_object().is_some()
    }

    /// Live handles in the bridge-owned table; `None` when the loader owns them
    pub fn live_handles(&self) -> Option<usize> {
        match &self.objects {
            Objects::Bridge(table) => Some(table.borrow().live()),
            Objects::Loader(_) => None,
        }
    }

    fn exports_object(&self) -> Option<Object> {
        if let Some(exports) = self.exports.borrow().as_ref() {
            return Some(exports.clone());
        }
        Reflect::get(&js_sys::global(), &JsValue::from_str(GLOBAL_EXPORTS))
            .ok()
            .and_then(|value| value.dyn_into::<Object>().ok())
    }

    fn export(&self, entry: HostEntry) -> Result<Function, HostError> {
        let exports = self.exports_object().ok_or(HostError::NotAttached)?;
        let name = entry.export_name();
        Reflect::get(&exports, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or(HostError::MissingExport(name))
    }
}

impl Default for WasmHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostModule for WasmHost {
    fn wrap_content(&self, text: String) -> Result<ContentHandle, HostError> {
        match &self.objects {
            Objects::Bridge(table) => Ok(table.borrow_mut().wrap(text)),
            Objects::Loader(table) => table
                .js_object(&text)
                .map(ContentHandle::from_raw)
                .map_err(|e| HostError::Threw(describe_js_error(&e))),
        }
    }

    fn consume_content(&self, handle: ContentHandle) -> Result<String, HandleError> {
        match &self.objects {
            Objects::Bridge(table) => table.borrow_mut().consume(handle),
            Objects::Loader(table) => {
                let id = handle.id();
                let value = table
                    .consume_js_object(id.0)
                    .map_err(|_| HandleError::Unknown(id))?;
                value.as_string().ok_or(HandleError::NotText(id))
            }
        }
    }

    fn invoke(&self, entry: HostEntry, handle: ContentHandle) -> Result<(), HostError> {
        hand_over(self, handle, |raw| {
            self.export(entry)?
                .call1(&JsValue::NULL, &JsValue::from(raw))
                .map(|_| ())
                .map_err(|e| HostError::Threw(describe_js_error(&e)))
        })
    }
}
