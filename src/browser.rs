//! `DialogPlatform` on top of the browser's DOM and File System Access APIs

use js_sys::{Array, Function, Promise, Reflect};
use log::{debug, warn};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, Blob, BlobPropertyBag, Document, File, HtmlAnchorElement,
    HtmlInputElement, Url, Window,
};

use crate::error::{OpenError, SaveError};
use crate::js_interop::describe_js_error;
use crate::platform::{
    DialogPlatform, FileFilter, SavePicker, WritableStream, picker_rejection, write_and_close,
};

const SAVE_PICKER_API: &str = "showSaveFilePicker";

/// How long a download's object URL stays valid after the click
pub const REVOKE_DELAY_MS: i32 = 40_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPlatform;

impl BrowserPlatform {
    pub fn new() -> Self {
        Self
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}

// Look up `name` on `target` and call it as a method returning a promise
fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<Promise, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    method.apply(target, args)?.dyn_into()
}

fn save_rejection(error: JsValue) -> SaveError {
    let name = Reflect::get(&error, &JsValue::from_str("name"))
        .ok()
        .and_then(|value| value.as_string());
    picker_rejection(name.as_deref(), describe_js_error(&error))
}

fn write_failed(error: JsValue) -> SaveError {
    SaveError::WriteFailed(describe_js_error(&error))
}

// Plain objects, not `Map`s, for the `accept` table
fn picker_options(picker: &SavePicker) -> Result<JsValue, SaveError> {
    picker
        .options()
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| SaveError::WriteFailed(e.to_string()))
}

/// A `FileSystemWritableFileStream`
pub struct JsWritable(pub JsValue);

impl JsWritable {
    async fn call(&self, name: &str, args: &Array) -> Result<(), SaveError> {
        let pending = call_method(&self.0, name, args).map_err(write_failed)?;
        JsFuture::from(pending).await.map(drop).map_err(write_failed)
    }
}

impl WritableStream for JsWritable {
    async fn write(&self, text: &str) -> Result<(), SaveError> {
        self.call("write", &Array::of1(&JsValue::from_str(text))).await
    }

    async fn close(&self) -> Result<(), SaveError> {
        self.call("close", &Array::new()).await
    }
}

// Revoke an object URL once the download it backs has had time to start
fn revoke_later(window: &Window, url: String) {
    schedule_revoke(url, |callback, delay| {
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay)
    });
}

// `schedule` gets the revoking callback and the delay; if it fails the URL
// is revoked at once
fn schedule_revoke<S>(url: String, schedule: S)
where
    S: FnOnce(&Function, i32) -> Result<i32, JsValue>,
{
    let revoke_url = url.clone();
    let revoke = Closure::once_into_js(move || {
        if let Err(e) = Url::revoke_object_url(&revoke_url) {
            warn!("could not revoke {}: {}", revoke_url, describe_js_error(&e));
        }
    });
    if schedule(revoke.unchecked_ref(), REVOKE_DELAY_MS).is_err() {
        let _ = Url::revoke_object_url(&url);
    }
}

impl BrowserPlatform {
    // A fresh hidden <input type="file"> per call. Its change and cancel
    // listeners are registered once-only and settle the same promise, so
    // whichever fires first decides the outcome.
    async fn open_dialog(&self, filter: &FileFilter) -> Result<Option<File>, JsValue> {
        let input: HtmlInputElement = document()?.create_element("input")?.dyn_into()?;
        input.set_type("file");
        input.style().set_property("display", "none")?;
        if let Some(accept) = &filter.accept {
            input.set_accept(accept);
        }

        let options = AddEventListenerOptions::new();
        options.set_capture(false);
        options.set_once(true);

        let mut registered = Ok(());
        let selection = Promise::new(&mut |resolve: Function, _reject: Function| {
            let chosen = input.clone();
            let resolve_change = resolve.clone();
            let on_change = Closure::once_into_js(move || {
                let file = chosen.files().and_then(|files| files.get(0));
                let value = file.map(JsValue::from).unwrap_or(JsValue::NULL);
                let _ = resolve_change.call1(&JsValue::NULL, &value);
            });
            let on_cancel = Closure::once_into_js(move || {
                let _ = resolve.call1(&JsValue::NULL, &JsValue::NULL);
            });

            registered = input
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "change",
                    on_change.unchecked_ref(),
                    &options,
                )
                .and_then(|_| {
                    input.add_event_listener_with_callback_and_add_event_listener_options(
                        "cancel",
                        on_cancel.unchecked_ref(),
                        &options,
                    )
                });
        });
        registered?;

        input.click();
        let value = JsFuture::from(selection).await?;
        Ok(value.dyn_into::<File>().ok())
    }
}

impl DialogPlatform for BrowserPlatform {
    type File = File;

    async fn pick_file(&self, filter: &FileFilter) -> Option<File> {
        match self.open_dialog(filter).await {
            Ok(file) => file,
            Err(err) => {
                warn!("file dialog failed: {}", describe_js_error(&err));
                None
            }
        }
    }

    fn file_name(&self, file: &File) -> String {
        file.name()
    }

    async fn read_text(&self, file: File) -> Result<String, OpenError> {
        let text = JsFuture::from(file.text())
            .await
            .map_err(|e| OpenError::Read(describe_js_error(&e)))?;
        text.as_string().ok_or(OpenError::NotUtf8)
    }

    fn has_save_picker(&self) -> bool {
        window()
            .and_then(|window| Reflect::get(&window, &JsValue::from_str(SAVE_PICKER_API)))
            .map(|api| api.is_function())
            .unwrap_or(false)
    }

    async fn save_with_picker(&self, picker: &SavePicker, text: &str) -> Result<(), SaveError> {
        let window = window().map_err(|_| SaveError::Unsupported)?;
        let options = picker_options(picker)?;

        let shown = call_method(&window, SAVE_PICKER_API, &Array::of1(&options))
            .map_err(save_rejection)?;
        let file_handle = JsFuture::from(shown).await.map_err(save_rejection)?;

        let opened = call_method(&file_handle, "createWritable", &Array::new()).map_err(write_failed)?;
        let writable = JsWritable(JsFuture::from(opened).await.map_err(write_failed)?);

        write_and_close(&writable, text).await?;
        debug!("saved {} bytes through the save picker", text.len());
        Ok(())
    }

    fn download(&self, file_name: &str, mime: &str, text: &str) -> Result<(), SaveError> {
        let window = window().map_err(write_failed)?;
        let document = window
            .document()
            .ok_or_else(|| SaveError::WriteFailed("No document object".to_string()))?;

        let properties = BlobPropertyBag::new();
        properties.set_type(mime);
        let blob = Blob::new_with_str_sequence_and_options(&Array::of1(&JsValue::from_str(text)), &properties)
            .map_err(write_failed)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(write_failed)?;

        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(write_failed)?
            .dyn_into()
            .map_err(|e: web_sys::Element| write_failed(e.into()))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();

        revoke_later(&window, url);
        Ok(())
    }

    fn console_log(&self, text: &str) {
        web_sys::console::log_1(&JsValue::from_str(text));
    }
}
