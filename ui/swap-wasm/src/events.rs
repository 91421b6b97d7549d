//! Event wiring: buttons and wallet notifications both become [`Action`]s.

use crate::dom::Elements;
use crate::eip1193::{self, Eip1193Provider};
use crate::state;
use rb_session::Action;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Dispatch `$action` on every click of `$el`.
macro_rules! on_click_dispatch {
    ($el:expr, $action:expr) => {{
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            state::dispatch($action);
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

pub fn bind_buttons(els: &Elements) -> Result<(), JsValue> {
    on_click_dispatch!(els.connect_button, Action::Connect);
    on_click_dispatch!(els.approve_button, Action::Approve);
    on_click_dispatch!(els.swap_button, Action::Swap);
    on_click_dispatch!(els.faucet_button, Action::Faucet);
    Ok(())
}

pub fn bind_wallet(provider: &Eip1193Provider) -> Result<(), JsValue> {
    provider.on("accountsChanged", |value| match eip1193::parse_accounts(&value) {
        Ok(accounts) => state::dispatch(Action::AccountsChanged(accounts)),
        Err(err) => gloo_console::warn!("accountsChanged:", err.to_string()),
    })?;
    provider.on("chainChanged", |value| match eip1193::parse_chain_id(&value) {
        Ok(chain_id) => state::dispatch(Action::ChainChanged(chain_id)),
        Err(err) => gloo_console::warn!("chainChanged:", err.to_string()),
    })?;
    Ok(())
}
