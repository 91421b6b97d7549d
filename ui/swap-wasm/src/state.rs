//! Page-wide controller handle.
//!
//! The controller lives in a thread-local (WASM is single-threaded) behind
//! an async mutex so button clicks and wallet events run one at a time.

use crate::api::HttpDescriptors;
use crate::dom::Elements;
use crate::eip1193::Eip1193Provider;
use rb_session::{Action, SessionController};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::Mutex;

pub type Controller = SessionController<Eip1193Provider, HttpDescriptors, Elements>;

type Handle = Rc<Mutex<Controller>>;

thread_local! {
    static CONTROLLER: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

pub fn install(controller: Controller) {
    CONTROLLER.with(|c| *c.borrow_mut() = Some(Rc::new(Mutex::new(controller))));
}

fn handle() -> Option<Handle> {
    CONTROLLER.with(|c| c.borrow().clone())
}

/// Run `action` and wait for it, queueing behind any action in flight.
pub async fn run(action: Action) {
    let Some(handle) = handle() else {
        gloo_console::warn!("controller not installed, dropping", format!("{:?}", action));
        return;
    };
    let mut controller = handle.lock().await;
    controller.dispatch(action).await;
}

/// Fire-and-forget variant for event callbacks.
pub fn dispatch(action: Action) {
    wasm_bindgen_futures::spawn_local(run(action));
}
