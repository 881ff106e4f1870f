use commons::*;
use std::fmt;
use tokio::sync::mpsc;

/// Operator-triggered actions of the auction panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateAuction,
    PlaceBid,
    FetchHighestBid,
    EndAuction,
    WithdrawBid,
}

impl Action {
    pub const COUNT: usize = 5;

    pub const ALL: [Action; Action::COUNT] = [
        Action::CreateAuction,
        Action::PlaceBid,
        Action::FetchHighestBid,
        Action::EndAuction,
        Action::WithdrawBid,
    ];

    pub(crate) fn index(&self) -> usize {
        match self {
            Action::CreateAuction => 0,
            Action::PlaceBid => 1,
            Action::FetchHighestBid => 2,
            Action::EndAuction => 3,
            Action::WithdrawBid => 4,
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Action::CreateAuction => "Create Auction",
            Action::PlaceBid => "Place Bid",
            Action::FetchHighestBid => "Get Highest Bid",
            Action::EndAuction => "End Auction",
            Action::WithdrawBid => "Withdraw Bid",
        }
    }

    /// Contract function the action calls.
    pub fn entry_point(&self) -> &'static str {
        match self {
            Action::CreateAuction => CREATE_AUCTION,
            Action::PlaceBid => PLACE_BID,
            Action::FetchHighestBid => GET_CURRENT_HIGHEST_BID,
            Action::EndAuction => END_AUCTION,
            Action::WithdrawBid => WITHDRAW_BID,
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            Action::CreateAuction => "Auction created successfully!",
            Action::PlaceBid => "Bid placed successfully!",
            Action::FetchHighestBid => "Highest bid fetched",
            Action::EndAuction => "Auction ended successfully!",
            Action::WithdrawBid => "Bid withdrawn successfully!",
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            Action::CreateAuction => "Failed to create auction",
            Action::PlaceBid => "Failed to place bid",
            Action::FetchHighestBid => "Failed to fetch highest bid",
            Action::EndAuction => "Failed to end auction",
            Action::WithdrawBid => "Failed to withdraw bid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
    /// Action attempted without a session. No call was made.
    NotInitialized,
    /// A form field failed validation. No call was made.
    Invalid,
}

/// Transient message shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub action: Action,
    pub kind: NoticeKind,
    /// Bare message: the success text, the error text as reported by the
    /// contract or node, or the validation error.
    pub message: String,
    pub transaction_hash: Option<String>,
    /// A newer invocation of the same action was issued while this one was in
    /// flight.
    pub superseded: bool,
}

impl Notice {
    fn new(action: Action, kind: NoticeKind, message: String) -> Self {
        Self {
            action,
            kind,
            message,
            transaction_hash: None,
            superseded: false,
        }
    }

    pub fn success(action: Action, submitted: Submitted) -> Self {
        Self {
            transaction_hash: Some(submitted.transaction_hash),
            ..Self::new(action, NoticeKind::Success, action.success_message().to_owned())
        }
    }

    pub fn failure(action: Action, message: impl Into<String>) -> Self {
        Self::new(action, NoticeKind::Failure, message.into())
    }

    pub fn not_initialized(action: Action) -> Self {
        Self::new(action, NoticeKind::NotInitialized, NOT_INITIALIZED.to_owned())
    }

    pub fn invalid(action: Action, err: &InputError) -> Self {
        Self::new(action, NoticeKind::Invalid, err.to_string())
    }

    pub fn superseded(mut self, superseded: bool) -> Self {
        self.superseded = superseded;
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoticeKind::Success => f.write_str(&self.message)?,
            NoticeKind::Failure => write!(f, "{}: {}", self.action.failure_prefix(), self.message)?,
            NoticeKind::NotInitialized => f.write_str(&self.message)?,
            NoticeKind::Invalid => write!(f, "{}: {}", self.action.label(), self.message)?,
        }
        if let Some(hash) = &self.transaction_hash {
            write!(f, " (tx {})", hash)?;
        }
        Ok(())
    }
}

pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Delivers notices to whoever renders them.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, NoticeReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn publish(&self, notice: Notice) {
        // Receiver is gone once the UI shut down
        let _ = self.sender.send(notice);
    }
}
