/// Hold My Page - Chrome Extension for holding tabs on a remote bookmarking service
/// Built with Rust + WASM + Yew

mod bookmark_cache;
mod browser;
mod client;
mod config;
mod error;
mod links;
mod tab_data;
mod workflow;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    browser::register_tab_activation_listener();
    yew::Renderer::<ui::popup::App>::new().render();
}
