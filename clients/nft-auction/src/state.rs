use commons::*;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::Action;

/// Raw contents of the auction form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuctionForm {
    pub nft_id: String,
    pub start_price: String,
    pub auction_duration: String,
    pub bid_amount: String,
}

impl AuctionForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::NftId => &self.nft_id,
            FormField::StartPrice => &self.start_price,
            FormField::AuctionDuration => &self.auction_duration,
            FormField::BidAmount => &self.bid_amount,
        }
    }

    pub fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::NftId => &mut self.nft_id,
            FormField::StartPrice => &mut self.start_price,
            FormField::AuctionDuration => &mut self.auction_duration,
            FormField::BidAmount => &mut self.bid_amount,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }
}

/// Result view of the "get highest bid" action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighestBidView {
    pub bidder: Option<String>,
    /// Decimal amount.
    pub amount: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl HighestBidView {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
    }

    pub(crate) fn resolve(&mut self, bid: &HighestBid) {
        self.bidder = Some(bid.bidder.clone());
        self.amount = Some(bid.amount.to_string());
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.bidder = None;
        self.amount = None;
        self.loading = false;
        self.error = Some(message.into());
    }
}

/// Identifies one invocation of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub action: Action,
    pub generation: u64,
}

/// Per-action generation counters. Issuing a token for an action invalidates
/// every token issued for it before.
#[derive(Debug, Default)]
pub struct RequestTokens {
    generations: [AtomicU64; Action::COUNT],
}

impl RequestTokens {
    pub fn issue(&self, action: Action) -> RequestToken {
        let generation = self.generations[action.index()].fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken { action, generation }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.generations[token.action.index()].load(Ordering::SeqCst) == token.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_form_fields() {
        let mut form = AuctionForm::default();
        form.set(FormField::StartPrice, "100");
        form.get_mut(FormField::NftId).push('7');

        assert_eq!(form.get(FormField::StartPrice), "100");
        assert_eq!(form.nft_id, "7");
        assert_eq!(form.get(FormField::BidAmount), "");
    }

    #[test]
    fn test_view_transitions() {
        let mut view = HighestBidView::default();
        view.begin();
        assert!(view.loading);

        view.resolve(&HighestBid {
            bidder: "0x1".to_owned(),
            amount: BigUint::from(9u32),
        });
        assert_eq!(
            view,
            HighestBidView {
                bidder: Some("0x1".to_owned()),
                amount: Some("9".to_owned()),
                loading: false,
                error: None,
            }
        );

        view.begin();
        view.fail("auction not found");
        assert_eq!(view.bidder, None);
        assert_eq!(view.error.as_deref(), Some("auction not found"));
        assert!(!view.loading);
    }

    #[test]
    fn test_tokens_are_per_action() {
        let tokens = RequestTokens::default();
        let first = tokens.issue(Action::FetchHighestBid);
        let bid = tokens.issue(Action::PlaceBid);
        assert!(tokens.is_current(&first));
        assert!(tokens.is_current(&bid));

        let second = tokens.issue(Action::FetchHighestBid);
        assert!(!tokens.is_current(&first));
        assert!(tokens.is_current(&second));
        assert!(tokens.is_current(&bid));
    }
}
