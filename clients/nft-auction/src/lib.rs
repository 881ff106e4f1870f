//! Operator client for a Starknet NFT auction contract.
//!
//! Connects once at startup with a provider, a signing account and a bound
//! contract, then exposes the auction actions (create, bid, query the highest
//! bid, end, withdraw) through a terminal panel.
pub mod connection;
pub mod events;
pub mod external;
pub mod panel;
pub mod rpc;
pub mod state;
pub mod ui;
