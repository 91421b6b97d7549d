use crate::policy::ActionState;

/// Page regions the session shows and hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Loader,
    Main,
    Connect,
    Connected,
}

/// User-facing alerts.
///
/// `UnsupportedNetwork::current` shows up in the log line only; the alert
/// names the networks to switch to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    WalletMissing,
    UnsupportedNetwork { current: String, supported: Vec<String> },
    ZeroBalance,
    NotConnected,
    CallFailed(String),
    StartupFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::WalletMissing => "Please install Metamask browser extension.".to_owned(),
            Notice::UnsupportedNetwork { supported, .. } => format!(
                "Please connect to {}",
                supported.join(" or ").to_lowercase()
            ),
            Notice::ZeroBalance => {
                "Your balance is zero. Request some test tokens from faucet".to_owned()
            }
            Notice::NotConnected => "Connect your wallet first.".to_owned(),
            Notice::CallFailed(detail) => format!("Transaction failed: {detail}"),
            Notice::StartupFailed(detail) => format!("Could not load the swap contracts: {detail}"),
        }
    }
}

/// Everything the session controller writes to the page.
pub trait SessionView {
    fn set_visible(&self, region: Region, visible: bool);
    fn set_network(&self, name: &str);
    /// `short` goes in the label, `full` is kept for hover/copy.
    fn set_address(&self, short: &str, full: &str);
    fn set_balances(&self, token_v1: &str, token_v2: &str);
    fn set_swap_rate(&self, rate: Option<&str>);
    fn set_actions(&self, actions: ActionState);
    fn set_busy(&self, busy: bool);
    fn notify(&self, notice: &Notice);
}
