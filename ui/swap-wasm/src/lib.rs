//! Rebased swap page, compiled to WASM.
//!
//! Binds the DOM, detects the injected wallet and hands both to the
//! session controller. Everything after startup is event driven.

pub mod api;
pub mod dom;
pub mod eip1193;
pub mod events;
pub mod state;

use rb_chain_config::ChainRegistry;
use rb_session::{Action, SessionController, SessionSettings};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;
    let provider = Rc::new(eip1193::Eip1193Provider::detect());

    let mut settings = SessionSettings::default();
    if let Some(base) = els.descriptor_base() {
        settings.descriptor_base = base;
    }
    if let Some(policy) = els.approval_policy() {
        match policy.parse() {
            Ok(policy) => settings.approval_policy = policy,
            Err(err) => gloo_console::warn!(err.to_string()),
        }
    }

    let controller = SessionController::new(
        provider.clone(),
        api::HttpDescriptors,
        els.clone(),
        ChainRegistry::builtin(),
        settings,
    );
    state::install(controller);

    events::bind_buttons(&els)?;
    events::bind_wallet(&provider)?;

    state::run(Action::Start).await;
    gloo_console::log!("swap page ready");
    Ok(())
}
