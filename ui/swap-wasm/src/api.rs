//! Static asset fetches.
//!
//! Contract interface descriptors are served next to the page and loaded
//! with the browser `fetch`.

use crate::dom;
use alloy_json_abi::JsonAbi;
use async_trait::async_trait;
use rb_chain_client::{ChainError, DescriptorSource};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// GET `path` and return the body text. Non-2xx statuses are errors.
pub async fn fetch_text(path: &str) -> Result<String, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");

    let request = Request::new_with_str_and_init(path, &opts).map_err(|e| format!("{:?}", e))?;
    let window = dom::window().ok_or_else(|| "no window".to_string())?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("{:?}", e))?;
    let resp: Response = resp_value.dyn_into().map_err(|e| format!("{:?}", e))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    let text = JsFuture::from(resp.text().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("{:?}", e))?;
    text.as_string().ok_or_else(|| "response body is not text".to_string())
}

/// Loads `*.abi.json` descriptors over HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDescriptors;

#[async_trait(?Send)]
impl DescriptorSource for HttpDescriptors {
    async fn fetch(&self, path: &str) -> Result<JsonAbi, ChainError> {
        let body = fetch_text(path).await.map_err(|reason| ChainError::DescriptorFetch {
            path: path.to_owned(),
            reason,
        })?;
        serde_json::from_str(&body).map_err(|e| ChainError::DescriptorFetch {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}
