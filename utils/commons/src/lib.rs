//! Shared building blocks of the Starknet NFT auction client.
//!
//! Holds the error types raised across the client, the contract entry point
//! names and configuration keys, and the conversion of operator input into
//! integers that fit a Starknet field element.
pub use crate::{calculations::*, constants::*, errors::*, types::*};
use num_bigint::BigUint;
use num_traits::{Num, One, Zero};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

mod calculations;
mod constants;
mod errors;
mod types;
