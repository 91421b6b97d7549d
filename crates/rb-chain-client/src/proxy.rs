use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, U256};
use rb_api_types::ContractRole;
use std::rc::Rc;
use tracing::{debug, info};

use crate::{ChainError, TxHash, TxRequest, WalletProvider};

#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    pub abi: JsonAbi,
    pub address: Address,
}

/// Handle for a transaction the wallet accepted but the chain may not have mined yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: TxHash,
    pub role: ContractRole,
    pub method: String,
}

/// One deployed contract, reached through the wallet provider.
///
/// Reads always hit the chain; nothing is cached here.
pub struct ContractProxy<P: ?Sized> {
    role: ContractRole,
    provider: Rc<P>,
    descriptor: Option<ContractDescriptor>,
    account: Option<Address>,
}

impl<P> ContractProxy<P>
where
    P: WalletProvider + ?Sized,
{
    pub fn new(role: ContractRole, provider: Rc<P>) -> Self {
        Self {
            role,
            provider,
            descriptor: None,
            account: None,
        }
    }

    pub fn role(&self) -> ContractRole {
        self.role
    }

    pub fn set_descriptor(&mut self, abi: JsonAbi, address: Address) {
        self.descriptor = Some(ContractDescriptor { abi, address });
    }

    pub fn set_account(&mut self, account: Address) {
        self.account = Some(account);
    }

    pub fn clear(&mut self) {
        self.descriptor = None;
        self.account = None;
    }

    pub fn address(&self) -> Option<Address> {
        self.descriptor.as_ref().map(|d| d.address)
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn is_configured(&self) -> bool {
        self.descriptor.is_some()
    }

    /// Descriptor and account are both bound.
    pub fn is_ready(&self) -> bool {
        self.descriptor.is_some() && self.account.is_some()
    }

    fn function(&self, method: &str, arity: usize) -> Result<(Address, &Function), ChainError> {
        let descriptor = self
            .descriptor
            .as_ref()
            .ok_or(ChainError::MissingDescriptor { role: self.role })?;

        let function = descriptor
            .abi
            .function(method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .ok_or_else(|| ChainError::UnknownMethod {
                role: self.role,
                method: method.to_owned(),
            })?;

        Ok((descriptor.address, function))
    }

    fn encode(&self, function: &Function, args: &[DynSolValue]) -> Result<Vec<u8>, ChainError> {
        function
            .abi_encode_input(args)
            .map_err(|err| ChainError::Call(format!("{}.{}: {err}", self.role, function.name)))
    }

    pub async fn read(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>, ChainError> {
        let (address, function) = self.function(method, args.len())?;
        let data = self.encode(function, args)?;

        let output = self
            .provider
            .call(TxRequest {
                from: self.account,
                to: address,
                data: data.into(),
            })
            .await?;

        if output.is_empty() && !function.outputs.is_empty() {
            return Err(ChainError::Call(format!(
                "{}.{} returned no data",
                self.role, method
            )));
        }

        let values = function
            .abi_decode_output(&output)
            .map_err(|err| ChainError::Call(format!("{}.{}: {err}", self.role, method)))?;
        debug!(role = %self.role, method, "contract read");
        Ok(values)
    }

    pub async fn read_uint(&self, method: &str, args: &[DynSolValue]) -> Result<U256, ChainError> {
        let values = self.read(method, args).await?;
        values
            .first()
            .and_then(DynSolValue::as_uint)
            .map(|(value, _)| value)
            .ok_or_else(|| {
                ChainError::Call(format!("{}.{} did not return an integer", self.role, method))
            })
    }

    /// Hand a state-changing call to the wallet for signing.
    pub async fn write(&self, method: &str, args: &[DynSolValue]) -> Result<PendingTx, ChainError> {
        let account = self.account.ok_or(ChainError::NoAccount { role: self.role })?;
        let (address, function) = self.function(method, args.len())?;
        let data = self.encode(function, args)?;

        let hash = self
            .provider
            .send_transaction(TxRequest {
                from: Some(account),
                to: address,
                data: data.into(),
            })
            .await?;

        info!(role = %self.role, method, %hash, "transaction sent");
        Ok(PendingTx {
            hash,
            role: self.role,
            method: method.to_owned(),
        })
    }
}
