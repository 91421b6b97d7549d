//! In-memory wallet, descriptor source and view for driving the controller.

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, U256, address, keccak256};
use async_trait::async_trait;
use rb_chain_client::{ChainError, DescriptorSource, TxHash, TxReceipt, TxRequest, WalletProvider};
use rb_chain_config::ROPSTEN;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::policy::ActionState;
use crate::view::{Notice, Region, SessionView};

pub const HOLDER: Address = address!("0x00000000000000000000000000000000000000b0");
pub const OTHER_HOLDER: Address = address!("0x00000000000000000000000000000000000000c0");
pub const FAUCET_AMOUNT: U256 = U256::from_limbs([50_000_000_000, 0, 0, 0]);
const SWAP_RATE: u64 = 2;

const TOKEN_ABI: &str = include_str!("../../../web/abi/erc20.abi.json");
const SWAP_ABI: &str = include_str!("../../../web/abi/rebased-swap.abi.json");
const FAUCET_ABI: &str = include_str!("../../../web/abi/rebased-test-faucet.abi.json");

fn selector(signature: &str) -> [u8; 4] {
    keccak256(signature.as_bytes())[..4].try_into().unwrap()
}

fn word(data: &[u8], index: usize) -> &[u8] {
    &data[4 + 32 * index..4 + 32 * (index + 1)]
}

fn word_address(data: &[u8], index: usize) -> Address {
    Address::from_slice(&word(data, index)[12..])
}

fn word_uint(data: &[u8], index: usize) -> U256 {
    U256::from_be_slice(word(data, index))
}

fn encode_uint(value: U256) -> Bytes {
    DynSolValue::Uint(value, 256).abi_encode().into()
}

enum Effect {
    Approve {
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
    Swap {
        owner: Address,
        amount: U256,
    },
    Faucet {
        owner: Address,
    },
}

struct PendingEffect {
    effect: Effect,
    revert: bool,
    polled: bool,
}

/// Simulates the Ropsten token pair, swap and faucet behind a wallet.
///
/// Writes take effect when their receipt is first reported, one poll after
/// submission. A swap the allowance or balance does not cover reverts.
pub struct MockWallet {
    available: bool,
    chain_id: Cell<u64>,
    authorized: Vec<Address>,
    granted: Vec<Address>,
    balances: RefCell<HashMap<(Address, Address), U256>>,
    allowances: RefCell<HashMap<(Address, Address, Address), U256>>,
    calls: RefCell<Vec<TxRequest>>,
    sent: RefCell<Vec<TxRequest>>,
    pending: RefCell<HashMap<TxHash, PendingEffect>>,
    reject_next: Cell<bool>,
    revert_next: Cell<bool>,
    pauses: Cell<usize>,
}

impl MockWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            available: true,
            chain_id: Cell::new(chain_id),
            authorized: Vec::new(),
            granted: Vec::new(),
            balances: RefCell::default(),
            allowances: RefCell::default(),
            calls: RefCell::default(),
            sent: RefCell::default(),
            pending: RefCell::default(),
            reject_next: Cell::new(false),
            revert_next: Cell::new(false),
            pauses: Cell::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            available: false,
            ..Self::on_chain(0)
        }
    }

    pub fn authorized(mut self, account: Address) -> Self {
        self.authorized.push(account);
        self
    }

    pub fn grants_on_request(mut self, account: Address) -> Self {
        self.granted.push(account);
        self
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.balances.borrow_mut().insert((token, owner), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances
            .borrow_mut()
            .insert((token, owner, spender), amount);
    }

    pub fn switch_chain(&self, chain_id: u64) {
        self.chain_id.set(chain_id);
    }

    pub fn reject_next(&self) {
        self.reject_next.set(true);
    }

    pub fn revert_next(&self) {
        self.revert_next.set(true);
    }

    pub fn calls(&self) -> Vec<TxRequest> {
        self.calls.borrow().clone()
    }

    pub fn sent(&self) -> Vec<TxRequest> {
        self.sent.borrow().clone()
    }

    pub fn pauses(&self) -> usize {
        self.pauses.get()
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .borrow()
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .borrow()
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn apply(&self, effect: &Effect) {
        match *effect {
            Effect::Approve {
                token,
                owner,
                spender,
                amount,
            } => self.set_allowance(token, owner, spender, amount),
            Effect::Swap { owner, amount } => {
                let v1 = ROPSTEN.reb_v1_address;
                let v2 = ROPSTEN.reb_v2_address;
                let swap = ROPSTEN.swap_address;
                self.set_balance(v1, owner, self.balance(v1, owner) - amount);
                self.set_balance(
                    v2,
                    owner,
                    self.balance(v2, owner) + amount * U256::from(SWAP_RATE),
                );
                self.set_allowance(
                    v1,
                    owner,
                    swap,
                    self.allowance(v1, owner, swap) - amount,
                );
            }
            Effect::Faucet { owner } => {
                let v1 = ROPSTEN.reb_v1_address;
                self.set_balance(v1, owner, self.balance(v1, owner) + FAUCET_AMOUNT);
            }
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.authorized.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ChainError> {
        if self.reject_next.replace(false) {
            return Err(ChainError::from_rpc("eth_requestAccounts", 4001, "User rejected the request."));
        }
        if self.granted.is_empty() {
            return Ok(self.authorized.clone());
        }
        Ok(self.granted.clone())
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.chain_id.get())
    }

    async fn call(&self, request: TxRequest) -> Result<Bytes, ChainError> {
        self.calls.borrow_mut().push(request.clone());
        let data = &request.data[..];
        let method = &data[..4];

        if method == selector("balanceOf(address)") {
            Ok(encode_uint(self.balance(request.to, word_address(data, 0))))
        } else if method == selector("allowance(address,address)") {
            Ok(encode_uint(self.allowance(
                request.to,
                word_address(data, 0),
                word_address(data, 1),
            )))
        } else if method == selector("getOutputAmount(uint256)") {
            Ok(encode_uint(word_uint(data, 0) * U256::from(SWAP_RATE)))
        } else {
            Err(ChainError::Call("execution reverted".to_owned()))
        }
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<TxHash, ChainError> {
        if self.reject_next.replace(false) {
            return Err(ChainError::from_rpc(
                "eth_sendTransaction",
                4001,
                "MetaMask Tx Signature: User denied transaction signature.",
            ));
        }

        let owner = request
            .from
            .ok_or_else(|| ChainError::Call("missing sender".to_owned()))?;
        let data = &request.data[..];
        let method = &data[..4];

        let effect = if method == selector("approve(address,uint256)") {
            Effect::Approve {
                token: request.to,
                owner,
                spender: word_address(data, 0),
                amount: word_uint(data, 1),
            }
        } else if method == selector("swap(uint256)") {
            Effect::Swap {
                owner,
                amount: word_uint(data, 0),
            }
        } else if method == selector("requestTokens()") {
            Effect::Faucet { owner }
        } else {
            return Err(ChainError::Call("unknown method".to_owned()));
        };

        let uncovered = match effect {
            Effect::Swap { owner, amount } => {
                let v1 = ROPSTEN.reb_v1_address;
                self.allowance(v1, owner, ROPSTEN.swap_address) < amount
                    || self.balance(v1, owner) < amount
            }
            _ => false,
        };

        self.sent.borrow_mut().push(request.clone());
        let nonce = self.sent.borrow().len();
        let hash = TxHash::with_last_byte(nonce as u8);
        self.pending.borrow_mut().insert(
            hash,
            PendingEffect {
                effect,
                revert: self.revert_next.replace(false) || uncovered,
                polled: false,
            },
        );
        Ok(hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainError> {
        let mut pending = self.pending.borrow_mut();
        let Some(entry) = pending.get_mut(&tx_hash) else {
            return Err(ChainError::Call(format!("unknown transaction {tx_hash}")));
        };
        if !entry.polled {
            entry.polled = true;
            return Ok(None);
        }

        let Some(entry) = pending.remove(&tx_hash) else {
            return Ok(None);
        };
        drop(pending);
        if !entry.revert {
            self.apply(&entry.effect);
        }
        Ok(Some(TxReceipt {
            tx_hash,
            block_number: Some(1),
            success: !entry.revert,
        }))
    }

    async fn pause(&self, _interval: Duration) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

/// Serves the shipped descriptors; can be told to fail one path.
pub struct MockDescriptors {
    wallet: Rc<MockWallet>,
    failing: Option<String>,
    fetched: RefCell<Vec<String>>,
    calls_seen: RefCell<Vec<usize>>,
}

impl MockDescriptors {
    pub fn new(wallet: Rc<MockWallet>) -> Self {
        Self {
            wallet,
            failing: None,
            fetched: RefCell::default(),
            calls_seen: RefCell::default(),
        }
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing = Some(path.to_owned());
        self
    }

    pub fn fetched_paths(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }

    /// Number of contract reads the wallet had served at each fetch.
    pub fn calls_seen_during_fetch(&self) -> Vec<usize> {
        self.calls_seen.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DescriptorSource for MockDescriptors {
    async fn fetch(&self, path: &str) -> Result<JsonAbi, ChainError> {
        self.fetched.borrow_mut().push(path.to_owned());
        self.calls_seen.borrow_mut().push(self.wallet.calls().len());

        if self.failing.as_deref() == Some(path) {
            return Err(ChainError::DescriptorFetch {
                path: path.to_owned(),
                reason: "404 Not Found".to_owned(),
            });
        }

        let body = if path.ends_with("erc20.abi.json") {
            TOKEN_ABI
        } else if path.ends_with("rebased-swap.abi.json") {
            SWAP_ABI
        } else if path.ends_with("rebased-test-faucet.abi.json") {
            FAUCET_ABI
        } else {
            return Err(ChainError::DescriptorFetch {
                path: path.to_owned(),
                reason: "404 Not Found".to_owned(),
            });
        };

        serde_json::from_str(body).map_err(|err| ChainError::DescriptorFetch {
            path: path.to_owned(),
            reason: err.to_string(),
        })
    }
}

#[derive(Default)]
struct ViewLog {
    network: String,
    address: (String, String),
    balances: (String, String),
    rate: Option<String>,
    actions: Vec<ActionState>,
    busy: bool,
    was_busy: bool,
    notices: Vec<Notice>,
    visible: HashMap<Region, bool>,
}

#[derive(Default)]
pub struct RecordingView {
    log: RefCell<ViewLog>,
}

impl RecordingView {
    pub fn network(&self) -> String {
        self.log.borrow().network.clone()
    }

    pub fn address(&self) -> (String, String) {
        self.log.borrow().address.clone()
    }

    pub fn balances(&self) -> (String, String) {
        self.log.borrow().balances.clone()
    }

    pub fn swap_rate(&self) -> Option<String> {
        self.log.borrow().rate.clone()
    }

    pub fn last_actions(&self) -> ActionState {
        self.log
            .borrow()
            .actions
            .last()
            .copied()
            .unwrap_or(ActionState::LOCKED)
    }

    pub fn action_history(&self) -> Vec<ActionState> {
        self.log.borrow().actions.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.log.borrow().busy
    }

    pub fn was_busy(&self) -> bool {
        self.log.borrow().was_busy
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.log.borrow().notices.clone()
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.log
            .borrow()
            .visible
            .get(&region)
            .copied()
            .unwrap_or(false)
    }
}

impl SessionView for RecordingView {
    fn set_visible(&self, region: Region, visible: bool) {
        self.log.borrow_mut().visible.insert(region, visible);
    }

    fn set_network(&self, name: &str) {
        self.log.borrow_mut().network = name.to_owned();
    }

    fn set_address(&self, short: &str, full: &str) {
        self.log.borrow_mut().address = (short.to_owned(), full.to_owned());
    }

    fn set_balances(&self, token_v1: &str, token_v2: &str) {
        self.log.borrow_mut().balances = (token_v1.to_owned(), token_v2.to_owned());
    }

    fn set_swap_rate(&self, rate: Option<&str>) {
        self.log.borrow_mut().rate = rate.map(str::to_owned);
    }

    fn set_actions(&self, actions: ActionState) {
        self.log.borrow_mut().actions.push(actions);
    }

    fn set_busy(&self, busy: bool) {
        let mut log = self.log.borrow_mut();
        log.busy = busy;
        log.was_busy |= busy;
    }

    fn notify(&self, notice: &Notice) {
        self.log.borrow_mut().notices.push(notice.clone());
    }
}
