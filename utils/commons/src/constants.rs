/// Entry point that lists an NFT for auction.
pub const CREATE_AUCTION: &str = "create_auction";

/// Entry point that places a bid on a listed NFT.
pub const PLACE_BID: &str = "place_bid";

/// Read-only entry point returning the current `(bidder, amount)` pair.
pub const GET_CURRENT_HIGHEST_BID: &str = "get_current_highest_bid";

/// Entry point that closes an auction.
pub const END_AUCTION: &str = "end_auction";

/// Entry point that returns an outbid amount to its bidder.
pub const WITHDRAW_BID: &str = "withdraw_bid";

/// RPC endpoint of the Starknet node.
pub const ENV_RPC_URL: &str = "STARKNET_RPC_URL";

/// Address of the signing account.
pub const ENV_ACCOUNT_ADDRESS: &str = "STARKNET_ACCOUNT_ADDRESS";

/// Private key of the signing account.
pub const ENV_PRIVATE_KEY: &str = "STARKNET_PRIVATE_KEY";

/// Address of the deployed auction contract.
pub const ENV_CONTRACT_ADDRESS: &str = "AUCTION_CONTRACT_ADDRESS";

/// Chain id short string, e.g. `SN_MAIN` or `SN_SEPOLIA`.
pub const ENV_CHAIN_ID: &str = "STARKNET_CHAIN_ID";

/// Optional path to the contract ABI JSON.
pub const ENV_ABI_PATH: &str = "AUCTION_ABI_PATH";

/// Set to `1` or `true` to coerce malformed numeric input to zero.
pub const ENV_LENIENT_INPUT: &str = "AUCTION_LENIENT_INPUT";

pub const DEFAULT_CHAIN_ID: &str = "SN_SEPOLIA";

pub const NOT_INITIALIZED: &str = "Contract not initialized";

/// Bit width of each limb of a Cairo `u256`.
pub const U256_LIMB_BITS: usize = 128;
