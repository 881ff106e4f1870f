use super::*;

/// Errors raised while constructing the provider, account and contract
/// handles. Any of them leaves the client without a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// A configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The RPC provider could not be constructed.
    #[error("failed to connect provider: {0}")]
    Provider(String),
    /// The signing account could not be constructed.
    #[error("failed to load account: {0}")]
    Account(String),
    /// The contract handle could not be bound.
    #[error("failed to bind contract: {0}")]
    Contract(String),
    /// The contract interface does not expose the auction operations.
    #[error("contract interface mismatch: {0}")]
    Interface(#[from] AbiError),
}

/// Problems found in a contract ABI description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("malformed ABI: {0}")]
    Malformed(String),
    #[error("function `{0}` is missing")]
    MissingFunction(String),
    #[error("function `{name}` takes {actual} inputs, expected {expected}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("function `{name}` is `{actual}`, expected `{expected}`")]
    Mutability {
        name: String,
        expected: StateMutability,
        actual: StateMutability,
    },
    #[error("function `{0}` declares no outputs")]
    MissingOutputs(String),
}

/// Failure of a single contract call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractCallError {
    /// The contract or the sequencer refused the call. Carries the message
    /// unchanged so it can be shown to the operator as is.
    #[error("{0}")]
    Rejected(String),
    /// The node could not be reached or answered with garbage.
    #[error("transport error: {0}")]
    Transport(String),
    /// An argument does not fit the calldata encoding.
    #[error("cannot encode argument: {0}")]
    Encoding(String),
    /// The contract answered with data of an unexpected shape.
    #[error("unexpected contract output: {0}")]
    UnexpectedOutput(String),
}

/// Validation failure of a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} is empty")]
    Empty(FormField),
    #[error("{0} is not a number")]
    NotANumber(FormField),
    #[error("{0} must not be negative")]
    Negative(FormField),
    #[error("{0} does not fit in a field element")]
    OutOfRange(FormField),
}

impl InputError {
    pub fn field(&self) -> FormField {
        match *self {
            InputError::Empty(field)
            | InputError::NotANumber(field)
            | InputError::Negative(field)
            | InputError::OutOfRange(field) => field,
        }
    }
}
