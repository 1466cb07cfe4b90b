//! Leptos browser frontend.

pub mod app;
pub mod storage;

use wasm_bindgen::prelude::*;

/// WASM entry point, run when the module loads.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(app::App);
}
