use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::config::{Config, WifiCredentials};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("could not run link command: {0}")]
    Io(#[from] std::io::Error),

    #[error("link command failed: {0}")]
    Command(String),

    #[error("not associated after {0} status checks")]
    NotAssociated(u32),
}

/// A wireless (or wired) network link the panel can bring up and inspect.
pub trait Link {
    async fn associate(&mut self, credentials: &WifiCredentials) -> Result<(), LinkError>;
    async fn disassociate(&mut self) -> Result<(), LinkError>;
    async fn is_associated(&self) -> bool;
}

/// Wi-Fi through NetworkManager's `nmcli`.
#[derive(Default)]
pub struct NmcliLink {
    ssid: Option<String>,
}

async fn nmcli(args: &[&str]) -> Result<String, LinkError> {
    let output = Command::new("nmcli").args(args).output().await?;

    if !output.status.success() {
        return Err(LinkError::Command(
            String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// True if `nmcli -t -f TYPE,STATE device` lists a connected wifi device.
pub fn wifi_connected(device_table: &str) -> bool {
    device_table
        .lines()
        .filter_map(|line| line.split_once(':'))
        .any(|(kind, state)| kind == "wifi" && state.trim() == "connected")
}

impl Link for NmcliLink {
    async fn associate(&mut self, credentials: &WifiCredentials) -> Result<(), LinkError> {
        let mut args = vec!["device", "wifi", "connect", credentials.ssid.as_str()];
        if !credentials.password.is_empty() {
            args.extend(["password", credentials.password.as_str()]);
        }

        nmcli(&args).await?;
        self.ssid = Some(credentials.ssid.clone());
        Ok(())
    }

    async fn disassociate(&mut self) -> Result<(), LinkError> {
        match self.ssid.take() {
            Some(ssid) => nmcli(&["connection", "down", "id", ssid.as_str()]).await.map(|_| ()),
            None => Ok(()),
        }
    }

    async fn is_associated(&self) -> bool {
        match nmcli(&["-t", "-f", "TYPE,STATE", "device"]).await {
            Ok(table) => wifi_connected(&table),
            Err(e) => {
                log::warn!("Could not query link state: {e}");
                false
            }
        }
    }
}

/// For hosts whose network is managed elsewhere (wired, development machines).
pub struct HostLink;

impl Link for HostLink {
    async fn associate(&mut self, _credentials: &WifiCredentials) -> Result<(), LinkError> {
        Ok(())
    }

    async fn disassociate(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    async fn is_associated(&self) -> bool {
        true
    }
}

pub enum SystemLink {
    Host(HostLink),
    Nmcli(NmcliLink),
}

impl Link for SystemLink {
    async fn associate(&mut self, credentials: &WifiCredentials) -> Result<(), LinkError> {
        match self {
            SystemLink::Host(link) => link.associate(credentials).await,
            SystemLink::Nmcli(link) => link.associate(credentials).await,
        }
    }

    async fn disassociate(&mut self) -> Result<(), LinkError> {
        match self {
            SystemLink::Host(link) => link.disassociate().await,
            SystemLink::Nmcli(link) => link.disassociate().await,
        }
    }

    async fn is_associated(&self) -> bool {
        match self {
            SystemLink::Host(link) => link.is_associated().await,
            SystemLink::Nmcli(link) => link.is_associated().await,
        }
    }
}

/// Brings the link up and keeps it up between fetches.
pub struct Connectivity<L> {
    link: L,
    credentials: Option<WifiCredentials>,
    attempts: u32,
    poll: Duration,
    settle: Duration,
}

impl<L: Link> Connectivity<L> {
    pub fn new(link: L, config: &Config) -> Connectivity<L> {
        Connectivity {
            link,
            credentials: config.wifi.clone(),
            attempts: config.connect_attempts.max(1),
            poll: config.connect_poll,
            settle: config.reconnect_settle,
        }
    }

    pub async fn connect(&mut self) -> Result<(), LinkError> {
        if let Some(credentials) = &self.credentials {
            log::info!("Connecting to {}", credentials.ssid);
            if let Err(e) = self.link.associate(credentials).await {
                // association may still complete in the background; the status checks decide
                log::warn!("Association request failed: {e}");
            }
        }

        self.wait_for_association().await?;

        log::info!("Network is up");
        Ok(())
    }

    async fn wait_for_association(&self) -> Result<(), LinkError> {
        let link = &self.link;
        let attempts = self.attempts;

        tryhard::retry_fn(move || async move {
            if link.is_associated().await {
                Ok(())
            } else {
                Err(LinkError::NotAssociated(attempts))
            }
        })
        .retries(attempts - 1)
        .fixed_backoff(self.poll)
        .await
    }

    pub async fn is_connected(&self) -> bool {
        self.link.is_associated().await
    }

    /// Re-runs the connect sequence if the link has dropped. Returns whether the link is up.
    pub async fn reconnect(&mut self) -> bool {
        if self.link.is_associated().await {
            return true;
        }

        log::warn!("Reconnecting network...");
        if let Err(e) = self.link.disassociate().await {
            log::debug!("Disassociate before reconnect failed: {e}");
        }

        match self.connect().await {
            Ok(()) => {
                log::info!("Network reconnected");
                true
            }
            Err(e) => {
                log::warn!("Network reconnection failed: {e}");
                false
            }
        }
    }

    /// Liveness check before a fetch: reconnect and give the link time to settle if it dropped.
    pub async fn ensure_connected(&mut self) {
        if !self.is_connected().await {
            self.reconnect().await;
            tokio::time::sleep(self.settle).await;
        }
    }
}
