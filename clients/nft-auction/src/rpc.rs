//! Starknet JSON-RPC backend for the auction client.
use async_trait::async_trait;
use commons::*;
use num_bigint::BigUint;
use starknet::{
    accounts::{Account, ExecutionEncoding, SingleOwnerAccount},
    core::{
        types::{BlockId, BlockTag, Call, Felt, FunctionCall},
        utils::{cairo_short_string_to_felt, get_selector_from_name},
    },
    providers::{jsonrpc::HttpTransport, JsonRpcClient, Provider, ProviderError},
    signers::{LocalWallet, SigningKey},
};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::connection::{Backend, ConnectionConfig};
use crate::external::{AuctionContract, CreateAuctionParams, PlaceBidParams};

pub type RpcProvider = JsonRpcClient<HttpTransport>;

pub type RpcAccount = SingleOwnerAccount<RpcProvider, LocalWallet>;

/// Builds handles that talk to a Starknet node over JSON-RPC.
#[derive(Debug, Default, Clone, Copy)]
pub struct StarknetBackend;

impl Backend for StarknetBackend {
    type Provider = Arc<RpcProvider>;
    type Account = Arc<RpcAccount>;
    type Contract = StarknetAuction;

    fn connect_provider(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Self::Provider, ConnectionError> {
        let url = parse_url(&config.rpc_url).map_err(ConnectionError::Provider)?;
        Ok(Arc::new(JsonRpcClient::new(HttpTransport::new(url))))
    }

    fn connect_account(
        &self,
        _provider: &Self::Provider,
        config: &ConnectionConfig,
    ) -> Result<Self::Account, ConnectionError> {
        let address = parse_felt("account address", &config.account_address)
            .map_err(ConnectionError::Account)?;
        let secret =
            parse_felt("private key", &config.private_key).map_err(ConnectionError::Account)?;
        let chain_id = cairo_short_string_to_felt(&config.chain_id).map_err(|err| {
            ConnectionError::Account(format!("invalid chain id `{}`: {}", config.chain_id, err))
        })?;

        // The account owns its client, pointed at the same endpoint as the
        // session provider.
        let url = parse_url(&config.rpc_url).map_err(ConnectionError::Provider)?;
        let signer = LocalWallet::from(SigningKey::from_secret_scalar(secret));
        let mut account = SingleOwnerAccount::new(
            JsonRpcClient::new(HttpTransport::new(url)),
            signer,
            address,
            chain_id,
            ExecutionEncoding::New,
        );
        // Nonces must account for transactions not yet in a block
        account.set_block_id(BlockId::Tag(BlockTag::Pending));

        Ok(Arc::new(account))
    }

    fn bind_contract(
        &self,
        provider: &Self::Provider,
        account: &Self::Account,
        config: &ConnectionConfig,
    ) -> Result<Self::Contract, ConnectionError> {
        let address = parse_felt("contract address", &config.contract_address)
            .map_err(ConnectionError::Contract)?;
        let selectors = Selectors::resolve().map_err(ConnectionError::Contract)?;

        Ok(StarknetAuction {
            provider: Arc::clone(provider),
            account: Arc::clone(account),
            address,
            selectors,
        })
    }
}

struct Selectors {
    create_auction: Felt,
    place_bid: Felt,
    get_current_highest_bid: Felt,
    end_auction: Felt,
    withdraw_bid: Felt,
}

impl Selectors {
    fn resolve() -> Result<Self, String> {
        let selector = |name: &str| {
            get_selector_from_name(name)
                .map_err(|err| format!("bad entry point `{}`: {}", name, err))
        };
        Ok(Self {
            create_auction: selector(CREATE_AUCTION)?,
            place_bid: selector(PLACE_BID)?,
            get_current_highest_bid: selector(GET_CURRENT_HIGHEST_BID)?,
            end_auction: selector(END_AUCTION)?,
            withdraw_bid: selector(WITHDRAW_BID)?,
        })
    }
}

/// Auction contract bound to a deployed address. Reads go through the session
/// provider; writes are signed by the session account and sent as V3 invoke
/// transactions.
pub struct StarknetAuction {
    provider: Arc<RpcProvider>,
    account: Arc<RpcAccount>,
    address: Felt,
    selectors: Selectors,
}

impl StarknetAuction {
    async fn invoke(&self, selector: Felt, calldata: Vec<Felt>) -> CallResult<Submitted> {
        let call = Call {
            to: self.address,
            selector,
            calldata,
        };
        let result = self
            .account
            .execute_v3(vec![call])
            .send()
            .await
            .map_err(|err| ContractCallError::Rejected(err.to_string()))?;

        let transaction_hash = format!("{:#066x}", result.transaction_hash.to_biguint());
        debug!(%transaction_hash, "invoke transaction accepted");
        Ok(Submitted { transaction_hash })
    }
}

#[async_trait]
impl AuctionContract for StarknetAuction {
    async fn create_auction(&self, params: &CreateAuctionParams) -> CallResult<Submitted> {
        let calldata = vec![
            to_felt(&params.nft_id)?,
            to_felt(&params.start_price)?,
            to_felt(&params.auction_duration)?,
        ];
        self.invoke(self.selectors.create_auction, calldata).await
    }

    async fn place_bid(&self, params: &PlaceBidParams) -> CallResult<Submitted> {
        let calldata = vec![to_felt(&params.nft_id)?, to_felt(&params.bid_amount)?];
        self.invoke(self.selectors.place_bid, calldata).await
    }

    async fn get_current_highest_bid(&self, nft_id: &BigUint) -> CallResult<HighestBid> {
        let request = FunctionCall {
            contract_address: self.address,
            entry_point_selector: self.selectors.get_current_highest_bid,
            calldata: vec![to_felt(nft_id)?],
        };
        let output = self
            .provider
            .call(request, BlockId::Tag(BlockTag::Latest))
            .await
            .map_err(|err| match &err {
                ProviderError::StarknetError(_) => ContractCallError::Rejected(err.to_string()),
                _ => ContractCallError::Transport(err.to_string()),
            })?;

        decode_highest_bid(&output)
    }

    async fn end_auction(&self, nft_id: &BigUint) -> CallResult<Submitted> {
        self.invoke(self.selectors.end_auction, vec![to_felt(nft_id)?])
            .await
    }

    async fn withdraw_bid(&self, nft_id: &BigUint) -> CallResult<Submitted> {
        self.invoke(self.selectors.withdraw_bid, vec![to_felt(nft_id)?])
            .await
    }
}

fn parse_url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|err| format!("invalid RPC URL `{}`: {}", value, err))
}

/// Parse a hex (`0x`) or decimal field element.
fn parse_felt(label: &str, value: &str) -> Result<Felt, String> {
    if value.is_empty() {
        return Err(format!("{} is empty", label));
    }
    let parsed = if value.starts_with("0x") || value.starts_with("0X") {
        Felt::from_hex(value)
    } else {
        Felt::from_dec_str(value)
    };
    parsed.map_err(|_| format!("{} `{}` is not a valid field element", label, value))
}

fn to_felt(value: &BigUint) -> CallResult<Felt> {
    if *value >= field_prime() {
        return Err(ContractCallError::Encoding(format!(
            "{} does not fit in a field element",
            value
        )));
    }
    Felt::from_dec_str(&value.to_str_radix(10))
        .map_err(|_| ContractCallError::Encoding(value.to_string()))
}

/// Decode `(bidder, amount)`; the amount is either a single felt or a `u256`
/// split into low and high limbs.
fn decode_highest_bid(output: &[Felt]) -> CallResult<HighestBid> {
    let (bidder, amount) = match output {
        [bidder, amount] => (bidder, amount.to_biguint()),
        [bidder, low, high] => (
            bidder,
            low.to_biguint() + (high.to_biguint() << U256_LIMB_BITS),
        ),
        _ => {
            return Err(ContractCallError::UnexpectedOutput(format!(
                "expected 2 or 3 values, got {}",
                output.len()
            )))
        }
    };

    Ok(HighestBid {
        bidder: format!("{:#x}", bidder.to_biguint()),
        amount,
    })
}
