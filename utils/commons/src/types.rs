use super::*;

pub type CallResult<A> = Result<A, ContractCallError>;

/// Numeric input fields of the auction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    NftId,
    StartPrice,
    AuctionDuration,
    BidAmount,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::NftId => "NFT ID",
            FormField::StartPrice => "Start Price",
            FormField::AuctionDuration => "Auction Duration",
            FormField::BidAmount => "Bid Amount",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a contract function may change state, as declared in the ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    External,
    View,
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateMutability::External => f.write_str("external"),
            StateMutability::View => f.write_str("view"),
        }
    }
}

/// Current highest bid of an auction as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighestBid {
    /// Bidder address, hex encoded.
    pub bidder: String,
    pub amount: BigUint,
}

/// Receipt of a state-changing call that was accepted by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub transaction_hash: String,
}
