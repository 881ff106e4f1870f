//! Interface of the on-chain auction contract: call parameters, the
//! `AuctionContract` seam and validation of the contract ABI.
use async_trait::async_trait;
use commons::*;
use num_bigint::BigUint;
use serde::Deserialize;

/// ABI shipped with the client, used when no ABI path is configured.
pub const BUNDLED_ABI: &str = include_str!("../abi/nft_auction.json");

/// Parameters of `create_auction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAuctionParams {
    pub nft_id: BigUint,
    /// Smallest acceptable opening bid.
    pub start_price: BigUint,
    /// Auction length in seconds.
    pub auction_duration: BigUint,
}

/// Parameters of `place_bid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceBidParams {
    pub nft_id: BigUint,
    pub bid_amount: BigUint,
}

/// Typed binding to a deployed auction contract.
///
/// Every method performs exactly one call against the chain. State-changing
/// methods resolve once the node accepted the transaction.
#[async_trait]
pub trait AuctionContract: Send + Sync {
    async fn create_auction(&self, params: &CreateAuctionParams) -> CallResult<Submitted>;

    async fn place_bid(&self, params: &PlaceBidParams) -> CallResult<Submitted>;

    /// Read the current highest bid. Does not change state.
    async fn get_current_highest_bid(&self, nft_id: &BigUint) -> CallResult<HighestBid>;

    async fn end_auction(&self, nft_id: &BigUint) -> CallResult<Submitted>;

    async fn withdraw_bid(&self, nft_id: &BigUint) -> CallResult<Submitted>;
}

struct ExpectedFunction {
    name: &'static str,
    inputs: usize,
    mutability: StateMutability,
    returns_value: bool,
}

/// Functions the client calls, with the shape it calls them with.
const AUCTION_INTERFACE: [ExpectedFunction; 5] = [
    ExpectedFunction {
        name: CREATE_AUCTION,
        inputs: 3,
        mutability: StateMutability::External,
        returns_value: false,
    },
    ExpectedFunction {
        name: PLACE_BID,
        inputs: 2,
        mutability: StateMutability::External,
        returns_value: false,
    },
    ExpectedFunction {
        name: GET_CURRENT_HIGHEST_BID,
        inputs: 1,
        mutability: StateMutability::View,
        returns_value: true,
    },
    ExpectedFunction {
        name: END_AUCTION,
        inputs: 1,
        mutability: StateMutability::External,
        returns_value: false,
    },
    ExpectedFunction {
        name: WITHDRAW_BID,
        inputs: 1,
        mutability: StateMutability::External,
        returns_value: false,
    },
];

#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiOutput {
    #[serde(rename = "type")]
    pub ty: String,
}

/// Function signature as listed in a contract ABI.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiOutput>,
    /// Cairo 0 ABIs only mark views, under `stateMutability`.
    #[serde(default, alias = "stateMutability")]
    pub state_mutability: Option<StateMutability>,
}

impl AbiFunction {
    pub fn mutability(&self) -> StateMutability {
        self.state_mutability.unwrap_or(StateMutability::External)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AbiEntry {
    Function(AbiFunction),
    Interface {
        #[serde(default)]
        items: Vec<AbiEntry>,
    },
    #[serde(other)]
    Other,
}

/// Functions exposed by a contract, flattened out of its ABI.
#[derive(Debug, Clone, Default)]
pub struct ContractAbi {
    functions: Vec<AbiFunction>,
}

impl ContractAbi {
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries: Vec<AbiEntry> =
            serde_json::from_str(json).map_err(|err| AbiError::Malformed(err.to_string()))?;
        let mut functions = Vec::new();
        collect_functions(entries, &mut functions);
        Ok(Self { functions })
    }

    pub fn bundled() -> Result<Self, AbiError> {
        Self::from_json(BUNDLED_ABI)
    }

    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Check that the contract exposes every auction operation with the
    /// arity and mutability the client relies on.
    pub fn validate(&self) -> Result<(), AbiError> {
        for expected in AUCTION_INTERFACE.iter() {
            let function = self
                .function(expected.name)
                .ok_or_else(|| AbiError::MissingFunction(expected.name.to_owned()))?;

            if function.inputs.len() != expected.inputs {
                return Err(AbiError::Arity {
                    name: function.name.clone(),
                    expected: expected.inputs,
                    actual: function.inputs.len(),
                });
            }

            if function.mutability() != expected.mutability {
                return Err(AbiError::Mutability {
                    name: function.name.clone(),
                    expected: expected.mutability,
                    actual: function.mutability(),
                });
            }

            if expected.returns_value && function.outputs.is_empty() {
                return Err(AbiError::MissingOutputs(function.name.clone()));
            }
        }
        Ok(())
    }
}

fn collect_functions(entries: Vec<AbiEntry>, functions: &mut Vec<AbiFunction>) {
    for entry in entries {
        match entry {
            AbiEntry::Function(function) => functions.push(function),
            AbiEntry::Interface { items } => collect_functions(items, functions),
            AbiEntry::Other => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, inputs: usize, mutability: &str, outputs: usize) -> String {
        let inputs = (0..inputs)
            .map(|i| format!(r#"{{"name":"arg{}","type":"core::felt252"}}"#, i))
            .collect::<Vec<_>>()
            .join(",");
        let outputs = (0..outputs)
            .map(|_| r#"{"type":"core::felt252"}"#.to_owned())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            r#"{{"type":"function","name":"{}","inputs":[{}],"outputs":[{}],"state_mutability":"{}"}}"#,
            name, inputs, outputs, mutability
        )
    }

    fn abi(functions: &[String]) -> String {
        format!("[{}]", functions.join(","))
    }

    fn complete() -> Vec<String> {
        vec![
            function(CREATE_AUCTION, 3, "external", 0),
            function(PLACE_BID, 2, "external", 0),
            function(GET_CURRENT_HIGHEST_BID, 1, "view", 2),
            function(END_AUCTION, 1, "external", 0),
            function(WITHDRAW_BID, 1, "external", 0),
        ]
    }

    #[test]
    fn test_bundled_abi_is_valid() {
        let abi = ContractAbi::bundled().expect("bundled ABI parses");
        assert_eq!(abi.validate(), Ok(()));
        let getter = abi.function(GET_CURRENT_HIGHEST_BID).unwrap();
        assert_eq!(getter.inputs[0].name, "nft_id");
        assert_eq!(getter.mutability(), StateMutability::View);
    }

    #[test]
    fn test_flat_abi_is_valid() {
        let abi = ContractAbi::from_json(&abi(&complete())).unwrap();
        assert_eq!(abi.validate(), Ok(()));
    }

    #[test]
    fn test_missing_function() {
        let mut functions = complete();
        functions.pop();
        let abi = ContractAbi::from_json(&abi(&functions)).unwrap();
        assert_eq!(
            abi.validate(),
            Err(AbiError::MissingFunction(WITHDRAW_BID.to_owned()))
        );
    }

    #[test]
    fn test_empty_abi_is_rejected() {
        let abi = ContractAbi::from_json("[]").unwrap();
        assert_eq!(
            abi.validate(),
            Err(AbiError::MissingFunction(CREATE_AUCTION.to_owned()))
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let mut functions = complete();
        functions[1] = function(PLACE_BID, 3, "external", 0);
        let abi = ContractAbi::from_json(&abi(&functions)).unwrap();
        assert_eq!(
            abi.validate(),
            Err(AbiError::Arity {
                name: PLACE_BID.to_owned(),
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_mutability_mismatch() {
        let mut functions = complete();
        functions[3] = function(END_AUCTION, 1, "view", 0);
        let abi = ContractAbi::from_json(&abi(&functions)).unwrap();
        assert_eq!(
            abi.validate(),
            Err(AbiError::Mutability {
                name: END_AUCTION.to_owned(),
                expected: StateMutability::External,
                actual: StateMutability::View,
            })
        );
    }

    #[test]
    fn test_getter_without_outputs() {
        let mut functions = complete();
        functions[2] = function(GET_CURRENT_HIGHEST_BID, 1, "view", 0);
        let abi = ContractAbi::from_json(&abi(&functions)).unwrap();
        assert_eq!(
            abi.validate(),
            Err(AbiError::MissingOutputs(GET_CURRENT_HIGHEST_BID.to_owned()))
        );
    }

    #[test]
    fn test_cairo_zero_mutability() {
        let json = r#"[
            {"type":"function","name":"end_auction","inputs":[{"name":"nft_id","type":"felt"}],"outputs":[]},
            {"type":"function","name":"get_current_highest_bid","inputs":[{"name":"nft_id","type":"felt"}],
             "outputs":[{"name":"bidder","type":"felt"}],"stateMutability":"view"}
        ]"#;
        let abi = ContractAbi::from_json(json).unwrap();
        assert_eq!(
            abi.function(END_AUCTION).unwrap().mutability(),
            StateMutability::External
        );
        assert_eq!(
            abi.function(GET_CURRENT_HIGHEST_BID).unwrap().mutability(),
            StateMutability::View
        );
    }

    #[test]
    fn test_malformed_abi() {
        assert!(matches!(
            ContractAbi::from_json("{ not json"),
            Err(AbiError::Malformed(_))
        ));
    }
}
