use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_WEB_ROOT: &str = "./web";

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) listen_addr: SocketAddr,
    pub(crate) web_root: PathBuf,
}

impl ServerConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_raw = lookup("SWAP_LISTEN_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_raw
            .trim()
            .parse()
            .with_context(|| format!("invalid SWAP_LISTEN_ADDR {listen_raw:?}"))?;

        let web_root = lookup("SWAP_WEB_ROOT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEB_ROOT.to_owned());

        Ok(Self {
            listen_addr,
            web_root: PathBuf::from(web_root.trim()),
        })
    }
}
