use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, U256};
use rb_api_types::{CONTRACTS, ChainConfig, ContractRole, InterfaceKind, methods};
use rb_chain_client::{
    ContractProxy, DescriptorSource, TransactionSubmitter, TxReceipt, WalletProvider,
};
use rb_chain_config::{ChainRegistry, chain_name};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::display::{format_amount, shorten_address};
use crate::policy::{ActionState, actions_for};
use crate::view::{Notice, Region, SessionView};
use crate::{SessionError, SessionSettings, SessionState};

type Result<T> = std::result::Result<T, SessionError>;

/// Who is connected, and to which deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_address: Option<Address>,
    pub current_config: Option<ChainConfig>,
}

/// Snapshot taken by the last successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub token_v1: U256,
    pub token_v2: U256,
    pub allowance: U256,
    pub rate: Option<U256>,
    pub actions: ActionState,
}

/// Inputs the page feeds into the controller, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Connect,
    Approve,
    Swap,
    Faucet,
    Refresh,
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[derive(Debug, Clone, Copy)]
enum ConnectMode {
    Silent,
    Prompt,
}

pub struct SessionController<P: ?Sized, D, V> {
    provider: Rc<P>,
    descriptors: D,
    view: V,
    registry: ChainRegistry,
    settings: SessionSettings,
    session: Session,
    contracts: BTreeMap<ContractRole, ContractProxy<P>>,
    submitter: TransactionSubmitter<P>,
    state: SessionState,
    balances: Option<Balances>,
}

impl<P, D, V> SessionController<P, D, V>
where
    P: WalletProvider + ?Sized,
    D: DescriptorSource,
    V: SessionView,
{
    pub fn new(
        provider: Rc<P>,
        descriptors: D,
        view: V,
        registry: ChainRegistry,
        settings: SessionSettings,
    ) -> Self {
        let contracts = CONTRACTS
            .iter()
            .map(|spec| (spec.role, ContractProxy::new(spec.role, provider.clone())))
            .collect();
        let submitter = TransactionSubmitter::new(provider.clone(), settings.receipt_poll_interval);

        Self {
            provider,
            descriptors,
            view,
            registry,
            settings,
            session: Session::default(),
            contracts,
            submitter,
            state: SessionState::Disconnected,
            balances: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn balances(&self) -> Option<Balances> {
        self.balances
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn descriptors(&self) -> &D {
        &self.descriptors
    }

    pub fn proxy(&self, role: ContractRole) -> Option<&ContractProxy<P>> {
        self.contracts.get(&role)
    }

    /// Run one action to completion and turn any failure into a notice.
    pub async fn dispatch(&mut self, action: Action) {
        debug!(?action, state = ?self.state, "dispatch");
        let result = match action {
            Action::Start => {
                self.start().await;
                return;
            }
            Action::Connect => self.connect().await,
            Action::Approve => self.approve().await,
            Action::Swap => self.swap().await,
            Action::Faucet => self.faucet().await,
            Action::Refresh => self.refresh_balances().await.map(|_| ()),
            Action::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            Action::ChainChanged(chain_id) => self.on_chain_changed(chain_id).await,
        };
        self.report(result);
    }

    /// Page load. A missing wallet is not an error until the user asks to connect.
    pub async fn start(&mut self) {
        self.show_disconnected();
        if self.provider.is_available() {
            let result = self.establish(ConnectMode::Silent).await;
            self.report(result);
        } else {
            info!("no wallet provider on page load");
        }
        self.view.set_visible(Region::Loader, false);
        self.view.set_visible(Region::Main, true);
    }

    pub async fn connect(&mut self) -> Result<()> {
        self.establish(ConnectMode::Prompt).await
    }

    async fn establish(&mut self, mode: ConnectMode) -> Result<()> {
        self.transition(SessionState::ConnectingWallet);
        if !self.provider.is_available() {
            self.transition(SessionState::WalletMissing);
            return Err(SessionError::WalletUnavailable);
        }

        let accounts = match mode {
            ConnectMode::Silent => self.provider.authorized_accounts().await,
            ConnectMode::Prompt => self.provider.request_accounts().await,
        };
        let accounts = match accounts {
            Ok(accounts) => accounts,
            Err(err) => {
                let err = SessionError::from(err);
                if err == SessionError::UserRejected {
                    self.transition(SessionState::UserRejected);
                } else {
                    self.transition(SessionState::Disconnected);
                }
                return Err(err);
            }
        };

        match accounts.first() {
            Some(&account) => self.bind_session(account).await,
            None => {
                debug!(?mode, "wallet returned no accounts");
                self.disconnect();
                Ok(())
            }
        }
    }

    async fn bind_session(&mut self, account: Address) -> Result<()> {
        self.adopt_address(account);
        self.transition(SessionState::NetworkCheck);
        let chain_id = self.provider.chain_id().await?;
        self.check_network(chain_id).await?;
        self.bind_account(account);
        self.refresh_balances().await.map(|_| ())
    }

    fn adopt_address(&mut self, account: Address) {
        self.session.current_address = Some(account);
        self.balances = None;
        self.view.set_actions(ActionState::LOCKED);
        self.clear_balance_labels();
        self.view
            .set_address(&shorten_address(&account), &account.to_checksum(None));
        self.view.set_visible(Region::Connect, false);
        self.view.set_visible(Region::Connected, true);
    }

    async fn check_network(&mut self, chain_id: u64) -> Result<()> {
        self.transition(SessionState::NetworkCheck);
        self.view.set_network(chain_name(chain_id));

        let config = match self.registry.resolve(chain_id) {
            Ok(config) => config,
            Err(err) => {
                self.unbind_contracts();
                self.balances = None;
                self.clear_balance_labels();
                self.transition(SessionState::UnsupportedNetwork);
                return Err(err.into());
            }
        };

        self.transition(SessionState::ConfiguringContracts);
        self.view.set_busy(true);
        let loaded = self.load_descriptors().await;
        self.view.set_busy(false);

        let descriptors = match loaded {
            Ok(descriptors) => descriptors,
            Err(err) => {
                self.unbind_contracts();
                return Err(err);
            }
        };

        for (role, abi) in descriptors {
            if let Some(proxy) = self.contracts.get_mut(&role) {
                proxy.set_descriptor(abi, config.address(role));
            }
        }
        self.session.current_config = Some(config);
        info!(chain_id, "contracts configured");
        Ok(())
    }

    /// Fetch every descriptor before binding any, so a failure leaves nothing half-wired.
    async fn load_descriptors(&self) -> Result<Vec<(ContractRole, JsonAbi)>> {
        let mut fetched: BTreeMap<InterfaceKind, JsonAbi> = BTreeMap::new();
        let mut bound = Vec::with_capacity(CONTRACTS.len());

        for spec in CONTRACTS {
            let abi = match fetched.get(&spec.interface) {
                Some(abi) => abi.clone(),
                None => {
                    let path = format!(
                        "{}{}",
                        self.settings.descriptor_base,
                        spec.interface.descriptor_path()
                    );
                    let abi = self.descriptors.fetch(&path).await?;
                    fetched.insert(spec.interface, abi.clone());
                    abi
                }
            };
            bound.push((spec.role, abi));
        }

        Ok(bound)
    }

    fn bind_account(&mut self, account: Address) {
        for proxy in self.contracts.values_mut() {
            proxy.set_account(account);
        }
        self.transition(SessionState::AccountBound);
    }

    fn unbind_contracts(&mut self) {
        for proxy in self.contracts.values_mut() {
            proxy.clear();
        }
        self.session.current_config = None;
    }

    fn contracts_ready(&self) -> bool {
        self.contracts.len() == CONTRACTS.len() && self.contracts.values().all(|p| p.is_ready())
    }

    fn require_account(&self) -> Result<Address> {
        self.session.current_address.ok_or(SessionError::NotConnected)
    }

    fn require_ready(&self) -> Result<ChainConfig> {
        match self.session.current_config {
            Some(config) if self.contracts_ready() => Ok(config),
            _ => Err(SessionError::NotConfigured),
        }
    }

    fn contract(&self, role: ContractRole) -> Result<&ContractProxy<P>> {
        self.contracts.get(&role).ok_or(SessionError::NotConfigured)
    }

    /// Actions to show when nothing is in flight.
    fn settled_actions(&self) -> ActionState {
        match self.balances {
            Some(balances) => balances.actions,
            None if self.contracts_ready() => ActionState {
                faucet: true,
                ..ActionState::LOCKED
            },
            None => ActionState::LOCKED,
        }
    }

    pub async fn refresh_balances(&mut self) -> Result<Balances> {
        let account = self.require_account()?;
        let config = self.require_ready()?;

        self.view.set_actions(ActionState::LOCKED);
        match self.read_balances(account, config).await {
            Ok(balances) => {
                let decimals = self.settings.token_decimals;
                self.view.set_balances(
                    &format_amount(balances.token_v1, decimals),
                    &format_amount(balances.token_v2, decimals),
                );
                let rate = balances.rate.map(|rate| format_amount(rate, decimals));
                self.view.set_swap_rate(rate.as_deref());
                self.view.set_actions(balances.actions);

                self.balances = Some(balances);
                self.transition(SessionState::BalancesLoaded);
                Ok(balances)
            }
            Err(err) => {
                self.view.set_actions(self.settled_actions());
                Err(err)
            }
        }
    }

    async fn read_balances(&self, account: Address, config: ChainConfig) -> Result<Balances> {
        let owner = DynSolValue::Address(account);
        let token_v1_contract = self.contract(ContractRole::TokenV1)?;

        let token_v1 = token_v1_contract
            .read_uint(methods::BALANCE_OF, &[owner.clone()])
            .await?;
        let token_v2 = self
            .contract(ContractRole::TokenV2)?
            .read_uint(methods::BALANCE_OF, &[owner.clone()])
            .await?;
        let allowance = token_v1_contract
            .read_uint(
                methods::ALLOWANCE,
                &[owner, DynSolValue::Address(config.swap_address)],
            )
            .await?;
        debug!(%token_v1, %token_v2, %allowance, "balances read");

        let actions = actions_for(allowance, token_v1, self.settings.approval_policy);
        let rate = if actions.swap {
            let rate = self
                .contract(ContractRole::Swap)?
                .read_uint(methods::GET_OUTPUT_AMOUNT, &[uint(token_v1)])
                .await?;
            Some(rate)
        } else {
            None
        };

        Ok(Balances {
            token_v1,
            token_v2,
            allowance,
            rate,
            actions,
        })
    }

    /// Let the swap contract spend the whole token-v1 balance.
    pub async fn approve(&mut self) -> Result<()> {
        let account = self.require_account()?;
        let config = self.require_ready()?;

        let balance = self
            .contract(ContractRole::TokenV1)?
            .read_uint(methods::BALANCE_OF, &[DynSolValue::Address(account)])
            .await?;
        if balance.is_zero() {
            return Err(SessionError::ZeroBalance);
        }

        info!(%balance, spender = %config.swap_address, "approving swap contract");
        self.transact(
            ContractRole::TokenV1,
            methods::APPROVE,
            &[DynSolValue::Address(config.swap_address), uint(balance)],
        )
        .await?;
        self.refresh_balances().await.map(|_| ())
    }

    /// Swap the whole token-v1 balance.
    pub async fn swap(&mut self) -> Result<()> {
        let account = self.require_account()?;
        self.require_ready()?;

        let balance = self
            .contract(ContractRole::TokenV1)?
            .read_uint(methods::BALANCE_OF, &[DynSolValue::Address(account)])
            .await?;
        if balance.is_zero() {
            return Err(SessionError::ZeroBalance);
        }

        info!(%balance, "swapping");
        self.transact(ContractRole::Swap, methods::SWAP, &[uint(balance)])
            .await?;
        self.refresh_balances().await.map(|_| ())
    }

    pub async fn faucet(&mut self) -> Result<()> {
        self.require_account()?;
        self.require_ready()?;

        self.transact(ContractRole::Faucet, methods::REQUEST_TOKENS, &[])
            .await?;
        self.refresh_balances().await.map(|_| ())
    }

    async fn transact(
        &self,
        role: ContractRole,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TxReceipt> {
        self.view.set_actions(ActionState::LOCKED);
        self.view.set_busy(true);
        let result = match self.contracts.get(&role) {
            Some(proxy) => self
                .submitter
                .submit(proxy, method, args)
                .await
                .map_err(SessionError::from),
            None => Err(SessionError::NotConfigured),
        };
        self.view.set_busy(false);

        if result.is_err() {
            self.view.set_actions(self.settled_actions());
        }
        result
    }

    pub async fn on_accounts_changed(&mut self, accounts: Vec<Address>) -> Result<()> {
        let Some(&account) = accounts.first() else {
            info!("wallet reported no accounts");
            self.disconnect();
            return Ok(());
        };

        info!(%account, "active account changed");
        let configured = self.session.current_config.is_some()
            && self.contracts.values().all(|p| p.is_configured());
        if configured {
            self.adopt_address(account);
            self.bind_account(account);
            self.refresh_balances().await.map(|_| ())
        } else {
            self.bind_session(account).await
        }
    }

    pub async fn on_chain_changed(&mut self, chain_id: u64) -> Result<()> {
        info!(chain_id, "wallet switched network");
        self.balances = None;
        self.view.set_actions(ActionState::LOCKED);
        self.view.set_swap_rate(None);

        let Some(account) = self.session.current_address else {
            self.view.set_network(chain_name(chain_id));
            return Ok(());
        };

        self.session.current_config = None;
        self.check_network(chain_id).await?;
        self.bind_account(account);
        self.refresh_balances().await.map(|_| ())
    }

    pub fn disconnect(&mut self) {
        self.session = Session::default();
        self.balances = None;
        self.unbind_contracts();
        self.show_disconnected();
        self.transition(SessionState::Disconnected);
    }

    fn clear_balance_labels(&self) {
        self.view.set_balances("", "");
        self.view.set_swap_rate(None);
    }

    fn show_disconnected(&self) {
        self.view.set_actions(ActionState::LOCKED);
        self.view.set_address("", "");
        self.clear_balance_labels();
        self.view.set_visible(Region::Connect, true);
        self.view.set_visible(Region::Connected, false);
    }

    fn report(&self, result: Result<()>) {
        let Err(err) = result else {
            return;
        };

        match self.notice_for(&err) {
            Some(notice) => {
                warn!(error = %err, ?notice, state = ?self.state, "session action failed");
                self.view.notify(&notice);
            }
            None => info!("request rejected in wallet"),
        }
    }

    fn notice_for(&self, err: &SessionError) -> Option<Notice> {
        let notice = match err {
            SessionError::UserRejected => return None,
            SessionError::WalletUnavailable => Notice::WalletMissing,
            SessionError::UnsupportedNetwork(unsupported) => Notice::UnsupportedNetwork {
                current: format!(
                    "{} (chain {})",
                    chain_name(unsupported.chain_id),
                    unsupported.chain_id
                ),
                supported: self
                    .registry
                    .chain_ids()
                    .map(|id| chain_name(id).to_owned())
                    .collect(),
            },
            SessionError::ZeroBalance => Notice::ZeroBalance,
            SessionError::NotConnected => Notice::NotConnected,
            SessionError::Call(detail) => Notice::CallFailed(detail.clone()),
            SessionError::NetworkFetch { .. } | SessionError::NotConfigured => {
                Notice::StartupFailed(err.to_string())
            }
        };
        Some(notice)
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "session state");
        }
        self.state = next;
    }
}

fn uint(value: U256) -> DynSolValue {
    DynSolValue::Uint(value, 256)
}
