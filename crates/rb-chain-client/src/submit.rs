use alloy_dyn_abi::DynSolValue;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

use crate::{ChainError, ContractProxy, PendingTx, TxReceipt, WalletProvider};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Waits for wallet-submitted transactions to be mined.
///
/// There is no retry: resubmitting a swap or faucet request could execute it
/// twice, so a failure goes straight back to the caller.
pub struct TransactionSubmitter<P: ?Sized> {
    provider: Rc<P>,
    poll_interval: Duration,
}

impl<P> TransactionSubmitter<P>
where
    P: WalletProvider + ?Sized,
{
    pub fn new(provider: Rc<P>, poll_interval: Duration) -> Self {
        Self {
            provider,
            poll_interval,
        }
    }

    pub async fn confirm(&self, pending: PendingTx) -> Result<TxReceipt, ChainError> {
        loop {
            match self.provider.transaction_receipt(pending.hash).await? {
                Some(receipt) if receipt.success => {
                    info!(
                        role = %pending.role,
                        method = %pending.method,
                        hash = %pending.hash,
                        block = ?receipt.block_number,
                        "transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Some(_) => {
                    warn!(role = %pending.role, method = %pending.method, hash = %pending.hash, "transaction reverted");
                    return Err(ChainError::Reverted {
                        tx_hash: pending.hash,
                    });
                }
                None => self.provider.pause(self.poll_interval).await,
            }
        }
    }

    /// Write through `proxy` and wait for the result.
    pub async fn submit(
        &self,
        proxy: &ContractProxy<P>,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TxReceipt, ChainError> {
        let pending = proxy.write(method, args).await?;
        self.confirm(pending).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TxHash;
    use crate::testing::ScriptedWallet;
    use rb_api_types::ContractRole;

    fn pending() -> PendingTx {
        PendingTx {
            hash: TxHash::repeat_byte(0xab),
            role: ContractRole::Faucet,
            method: "requestTokens".to_owned(),
        }
    }

    fn receipt(success: bool) -> TxReceipt {
        TxReceipt {
            tx_hash: TxHash::repeat_byte(0xab),
            block_number: Some(7),
            success,
        }
    }

    #[tokio::test]
    async fn confirm_polls_until_the_receipt_appears() {
        let wallet = Rc::new(ScriptedWallet::default());
        *wallet.receipts.borrow_mut() = vec![None, None, Some(receipt(true))];
        let submitter = TransactionSubmitter::new(wallet.clone(), DEFAULT_POLL_INTERVAL);

        let confirmed = submitter.confirm(pending()).await.unwrap();
        assert_eq!(confirmed.block_number, Some(7));
        assert_eq!(*wallet.pauses.borrow(), 2);
    }

    #[tokio::test]
    async fn reverted_receipt_is_reported_once() {
        let wallet = Rc::new(ScriptedWallet::default());
        *wallet.receipts.borrow_mut() = vec![Some(receipt(false)), Some(receipt(true))];
        let submitter = TransactionSubmitter::new(wallet.clone(), DEFAULT_POLL_INTERVAL);

        let err = submitter.confirm(pending()).await.unwrap_err();
        assert_eq!(
            err,
            ChainError::Reverted {
                tx_hash: TxHash::repeat_byte(0xab)
            }
        );
        assert_eq!(wallet.receipts.borrow().len(), 1);
    }
}
