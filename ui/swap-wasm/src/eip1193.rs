//! Injected wallet (`window.ethereum`) bridge.
//!
//! Speaks EIP-1193 `request({ method, params })` and maps provider errors
//! onto [`ChainError`]. Code 4001 is a user rejection.

use crate::dom;
use alloy_primitives::{Address, B256, Bytes, hex};
use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use rb_chain_client::{ChainError, TxHash, TxReceipt, TxRequest, WalletProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub struct Eip1193Provider {
    ethereum: Option<Object>,
}

#[derive(Serialize)]
struct RpcTransaction<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    to: String,
    data: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    block_number: Option<String>,
    status: Option<String>,
}

impl Eip1193Provider {
    /// Look up `window.ethereum`. Absence is not an error here; every
    /// request reports [`ChainError::WalletUnavailable`] instead.
    pub fn detect() -> Self {
        let ethereum = dom::window()
            .and_then(|w| Reflect::get(&w, &JsValue::from_str("ethereum")).ok())
            .filter(|v| v.is_object())
            .and_then(|v| v.dyn_into::<Object>().ok());
        Self { ethereum }
    }

    fn ethereum(&self) -> Result<&Object, ChainError> {
        self.ethereum.as_ref().ok_or(ChainError::WalletUnavailable)
    }

    async fn request(&self, method: &str, params: Option<JsValue>) -> Result<JsValue, ChainError> {
        let ethereum = self.ethereum()?;

        let args = Object::new();
        Reflect::set(&args, &"method".into(), &method.into()).map_err(|e| rpc_error(method, &e))?;
        if let Some(params) = params {
            Reflect::set(&args, &"params".into(), &params).map_err(|e| rpc_error(method, &e))?;
        }

        let request = Reflect::get(ethereum, &"request".into())
            .and_then(|v| v.dyn_into::<Function>())
            .map_err(|_| ChainError::WalletUnavailable)?;
        let promise = request
            .call1(ethereum, &args)
            .map_err(|e| rpc_error(method, &e))?;

        JsFuture::from(Promise::from(promise))
            .await
            .map_err(|e| rpc_error(method, &e))
    }

    /// Subscribe to a provider event. The closure lives for the page lifetime.
    pub fn on(&self, event: &str, handler: impl FnMut(JsValue) + 'static) -> Result<(), JsValue> {
        let Some(ethereum) = self.ethereum.as_ref() else {
            return Ok(());
        };
        let on = Reflect::get(ethereum, &"on".into())?.dyn_into::<Function>()?;
        let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        on.call2(ethereum, &event.into(), cb.as_ref().unchecked_ref())?;
        cb.forget();
        Ok(())
    }
}

fn rpc_error(method: &str, err: &JsValue) -> ChainError {
    let code = Reflect::get(err, &"code".into())
        .ok()
        .and_then(|v| v.as_f64())
        .map(|c| c as i64)
        .unwrap_or(-1);
    let message = Reflect::get(err, &"message".into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    ChainError::from_rpc(method, code, message)
}

fn to_params<T: Serialize + ?Sized>(params: &T) -> Result<JsValue, ChainError> {
    params
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ChainError::Call(e.to_string()))
}

fn hex_u64(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16).ok()
}

/// Parse an `eth_accounts` result or an `accountsChanged` payload.
pub fn parse_accounts(value: &JsValue) -> Result<Vec<Address>, ChainError> {
    if !Array::is_array(value) {
        return Err(ChainError::Call("accounts payload is not an array".into()));
    }
    Array::from(value)
        .iter()
        .map(|v| {
            v.as_string()
                .and_then(|s| s.parse::<Address>().ok())
                .ok_or_else(|| ChainError::Call(format!("invalid account {:?}", v)))
        })
        .collect()
}

/// Parse an `eth_chainId` result or a `chainChanged` payload.
pub fn parse_chain_id(value: &JsValue) -> Result<u64, ChainError> {
    if let Some(id) = value.as_f64() {
        return Ok(id as u64);
    }
    value
        .as_string()
        .as_deref()
        .and_then(hex_u64)
        .ok_or_else(|| ChainError::Call(format!("invalid chain id {:?}", value)))
}

fn parse_hex<T: std::str::FromStr>(method: &str, value: &JsValue) -> Result<T, ChainError> {
    value
        .as_string()
        .and_then(|s| s.parse::<T>().ok())
        .ok_or_else(|| ChainError::Call(format!("{method}: unexpected result {:?}", value)))
}

fn rpc_transaction<'a>(request: &TxRequest, data: &'a str) -> RpcTransaction<'a> {
    RpcTransaction {
        from: request.from.map(|a| a.to_checksum(None)),
        to: request.to.to_checksum(None),
        data,
    }
}

#[async_trait(?Send)]
impl WalletProvider for Eip1193Provider {
    fn is_available(&self) -> bool {
        self.ethereum.is_some()
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, ChainError> {
        let value = self.request("eth_accounts", None).await?;
        parse_accounts(&value)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError> {
        let value = self.request("eth_requestAccounts", None).await?;
        parse_accounts(&value)
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let value = self.request("eth_chainId", None).await?;
        parse_chain_id(&value)
    }

    async fn call(&self, request: TxRequest) -> Result<Bytes, ChainError> {
        let data = hex::encode_prefixed(&request.data);
        let params = to_params(&(rpc_transaction(&request, &data), "latest"))?;
        let value = self.request("eth_call", Some(params)).await?;
        parse_hex::<Bytes>("eth_call", &value)
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<TxHash, ChainError> {
        let data = hex::encode_prefixed(&request.data);
        let params = to_params(&[rpc_transaction(&request, &data)])?;
        let value = self.request("eth_sendTransaction", Some(params)).await?;
        parse_hex::<B256>("eth_sendTransaction", &value)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainError> {
        let params = to_params(&[hex::encode_prefixed(tx_hash)])?;
        let value = self.request("eth_getTransactionReceipt", Some(params)).await?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        let receipt: RpcReceipt = serde_wasm_bindgen::from_value(value)
            .map_err(|e| ChainError::Call(format!("eth_getTransactionReceipt: {e}")))?;
        Ok(Some(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.as_deref().and_then(hex_u64),
            // Pre-Byzantium receipts carry no status.
            success: receipt.status.as_deref().map_or(true, |s| hex_u64(s) == Some(1)),
        }))
    }

    async fn pause(&self, interval: Duration) {
        gloo_timers::future::sleep(interval).await;
    }
}
