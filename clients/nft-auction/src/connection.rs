//! Connection management: reads configuration, builds the provider, account
//! and contract handles exactly once, and hands the result to the rest of the
//! client as an explicit [`ConnectionState`].
use commons::*;
use std::{env, fmt, fs, sync::Arc};
use tracing::{error, info, warn};

use crate::external::{AuctionContract, ContractAbi};

/// Values needed to reach the chain and the auction contract.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub rpc_url: String,
    pub account_address: String,
    pub private_key: String,
    pub contract_address: String,
    /// Chain id short string, e.g. `SN_SEPOLIA`.
    pub chain_id: String,
    pub abi: ContractAbi,
    pub input_mode: InputMode,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("rpc_url", &self.rpc_url)
            .field("account_address", &self.account_address)
            .field("private_key", &"<redacted>")
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("input_mode", &self.input_mode)
            .finish()
    }
}

impl ConnectionConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConnectionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Missing connection values are logged and left empty; the handle that
    /// needs them reports the failure during [`initialize`]. Only an
    /// unreadable or malformed ABI fails here.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConnectionError> {
        let value = |key: &str| lookup(key).map(|value| value.trim().to_owned());
        let required = |key: &str| {
            let found = value(key).unwrap_or_default();
            if found.is_empty() {
                warn!(variable = key, "configuration value is missing or empty");
            }
            found
        };

        let abi = match value(ENV_ABI_PATH).filter(|path| !path.is_empty()) {
            Some(path) => {
                let json = fs::read_to_string(&path).map_err(|err| {
                    ConnectionError::Config(format!("cannot read ABI at {}: {}", path, err))
                })?;
                ContractAbi::from_json(&json)?
            }
            None => ContractAbi::bundled()?,
        };

        let input_mode = match value(ENV_LENIENT_INPUT)
            .map(|flag| flag.to_ascii_lowercase())
            .as_deref()
        {
            Some("1") | Some("true") | Some("yes") => InputMode::Lenient,
            _ => InputMode::Strict,
        };

        Ok(Self {
            rpc_url: required(ENV_RPC_URL),
            account_address: required(ENV_ACCOUNT_ADDRESS),
            private_key: required(ENV_PRIVATE_KEY),
            contract_address: required(ENV_CONTRACT_ADDRESS),
            chain_id: value(ENV_CHAIN_ID)
                .filter(|chain| !chain.is_empty())
                .unwrap_or_else(|| DEFAULT_CHAIN_ID.to_owned()),
            abi,
            input_mode,
        })
    }
}

/// Constructs the three chain handles. Each step may fail; later steps only
/// run when the earlier ones succeeded.
pub trait Backend: Send + Sync + 'static {
    type Provider: Send + Sync;
    type Account: Send + Sync;
    type Contract: AuctionContract;

    fn connect_provider(&self, config: &ConnectionConfig)
        -> Result<Self::Provider, ConnectionError>;

    fn connect_account(
        &self,
        provider: &Self::Provider,
        config: &ConnectionConfig,
    ) -> Result<Self::Account, ConnectionError>;

    fn bind_contract(
        &self,
        provider: &Self::Provider,
        account: &Self::Account,
        config: &ConnectionConfig,
    ) -> Result<Self::Contract, ConnectionError>;
}

/// Fully initialized handles. Shared read-only by every action.
pub struct Session<B: Backend> {
    pub provider: B::Provider,
    pub account: B::Account,
    pub contract: B::Contract,
    pub chain_id: String,
    pub account_address: String,
    pub contract_address: String,
}

/// Outcome of [`initialize`]: either every handle or the reason there are none.
pub enum ConnectionState<B: Backend> {
    Ready(Arc<Session<B>>),
    Failed(ConnectionError),
}

impl<B: Backend> Clone for ConnectionState<B> {
    fn clone(&self) -> Self {
        match self {
            ConnectionState::Ready(session) => ConnectionState::Ready(Arc::clone(session)),
            ConnectionState::Failed(err) => ConnectionState::Failed(err.clone()),
        }
    }
}

impl<B: Backend> fmt::Debug for ConnectionState<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Ready(session) => f
                .debug_struct("Ready")
                .field("chain_id", &session.chain_id)
                .field("account_address", &session.account_address)
                .field("contract_address", &session.contract_address)
                .finish(),
            ConnectionState::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

impl<B: Backend> ConnectionState<B> {
    pub fn session(&self) -> Option<&Arc<Session<B>>> {
        match self {
            ConnectionState::Ready(session) => Some(session),
            ConnectionState::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ConnectionError> {
        match self {
            ConnectionState::Ready(_) => None,
            ConnectionState::Failed(err) => Some(err),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready(_))
    }
}

/// Build the provider, account and contract handles, in that order.
///
/// Runs once at startup. There is no retry: a failure is final for the
/// lifetime of the process and no handle is exposed.
pub fn initialize<B: Backend>(backend: &B, config: &ConnectionConfig) -> ConnectionState<B> {
    match connect(backend, config) {
        Ok(session) => {
            info!(
                chain_id = %session.chain_id,
                account = %session.account_address,
                contract = %session.contract_address,
                "connected to auction contract"
            );
            ConnectionState::Ready(Arc::new(session))
        }
        Err(err) => {
            error!(%err, "initialization failed");
            ConnectionState::Failed(err)
        }
    }
}

fn connect<B: Backend>(
    backend: &B,
    config: &ConnectionConfig,
) -> Result<Session<B>, ConnectionError> {
    let provider = backend.connect_provider(config)?;
    let account = backend.connect_account(&provider, config)?;
    config.abi.validate()?;
    let contract = backend.bind_contract(&provider, &account, config)?;

    Ok(Session {
        provider,
        account,
        contract,
        chain_id: config.chain_id.clone(),
        account_address: config.account_address.clone(),
        contract_address: config.contract_address.clone(),
    })
}
