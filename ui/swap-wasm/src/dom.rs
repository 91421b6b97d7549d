//! DOM element bindings.
//!
//! All fields are resolved once at startup. `Elements` is also the
//! [`SessionView`] the controller renders into.

use rb_session::{ActionState, Notice, Region, SessionView};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, Window};

// ── Helpers ──

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query(selector: &str) -> Option<Element> {
    document()?.query_selector(selector).ok()?
}

pub fn query_within(parent: &Element, selector: &str) -> Option<Element> {
    parent.query_selector(selector).ok()?
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn set_disabled(button: &HtmlButtonElement, disabled: bool) {
    button.set_disabled(disabled);
}

// ── Elements struct ──

/// Every DOM reference the swap page uses.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    pub root: Element,
    pub loader_container: Element,
    pub main: HtmlElement,
    pub network_label: Element,

    pub connect_container: Element,
    pub connect_button: HtmlButtonElement,

    pub connected_container: Element,
    pub address_label: Element,
    pub rebv1_label: Element,
    pub rebv2_label: Element,

    pub approve_button: HtmlButtonElement,
    pub swap_button: HtmlButtonElement,
    pub swap_rate_label: Element,
    pub faucet_button: HtmlButtonElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_button {
    ($id:expr) => {
        by_id_typed::<HtmlButtonElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing button #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after the module is instantiated.
    pub fn bind() -> Result<Elements, JsValue> {
        let root = document()
            .and_then(|d| d.document_element())
            .ok_or_else(|| JsValue::from_str("missing document element"))?;
        let main = query("main")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| JsValue::from_str("missing <main>"))?;

        let connect_container = get_el!("connect-container");
        let connect_button = query_within(&connect_container, "button")
            .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
            .ok_or_else(|| JsValue::from_str("missing #connect-container button"))?;

        let swap_button = get_button!("swap-button");
        let swap_rate_label = query_within(&swap_button, "span")
            .ok_or_else(|| JsValue::from_str("missing #swap-button span"))?;

        Ok(Elements {
            root,
            loader_container: get_el!("loader-container"),
            main,
            network_label: get_el!("network-label"),

            connect_container,
            connect_button,

            connected_container: get_el!("connected-container"),
            address_label: get_el!("address-label"),
            rebv1_label: get_el!("rebv1-label"),
            rebv2_label: get_el!("rebv2-label"),

            approve_button: get_button!("approve-button"),
            swap_button,
            swap_rate_label,
            faucet_button: get_button!("faucet-button"),
        })
    }

    pub fn descriptor_base(&self) -> Option<String> {
        self.main
            .get_attribute("data-descriptor-base")
            .filter(|base| !base.is_empty())
    }

    /// Raw `data-approval-policy` value, if set.
    pub fn approval_policy(&self) -> Option<String> {
        self.main
            .get_attribute("data-approval-policy")
            .filter(|policy| !policy.is_empty())
    }

    fn region(&self, region: Region) -> &Element {
        match region {
            Region::Loader => &self.loader_container,
            Region::Main => &self.main,
            Region::Connect => &self.connect_container,
            Region::Connected => &self.connected_container,
        }
    }
}

impl SessionView for Elements {
    fn set_visible(&self, region: Region, visible: bool) {
        toggle_class(self.region(region), "hidden", !visible);
        if region == Region::Loader && !visible {
            remove_class(&self.root, "anim-loading");
        }
    }

    fn set_network(&self, name: &str) {
        set_text(&self.network_label, name);
    }

    fn set_address(&self, short: &str, full: &str) {
        set_text(&self.address_label, short);
        let _ = self.address_label.set_attribute("title", full);
    }

    fn set_balances(&self, token_v1: &str, token_v2: &str) {
        set_text(&self.rebv1_label, token_v1);
        set_text(&self.rebv2_label, token_v2);
    }

    fn set_swap_rate(&self, rate: Option<&str>) {
        set_text(&self.swap_rate_label, rate.unwrap_or_default());
    }

    fn set_actions(&self, actions: ActionState) {
        set_disabled(&self.approve_button, !actions.approve);
        set_disabled(&self.swap_button, !actions.swap);
        set_disabled(&self.faucet_button, !actions.faucet);
    }

    fn set_busy(&self, busy: bool) {
        toggle_class(&self.root, "busy", busy);
    }

    fn notify(&self, notice: &Notice) {
        if let Some(window) = window() {
            let _ = window.alert_with_message(&notice.message());
        }
    }
}
