//! Auction panel: the five operator actions.
//!
//! Each action reads the form, converts its numeric fields, performs exactly
//! one contract call through the session and reports the outcome. Failures
//! never escape an action; they end up in a notice or in the highest bid view.
use commons::*;
use num_bigint::BigUint;
use std::sync::Arc;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::connection::{Backend, ConnectionState, Session};
use crate::events::{Action, Notice, NoticeReceiver, Notifier};
use crate::external::{AuctionContract, CreateAuctionParams, PlaceBidParams};
use crate::state::{AuctionForm, HighestBidView, RequestToken, RequestTokens};

/// What happened to a highest bid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written to the view.
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    /// No call was made.
    Aborted,
}

/// Result of running one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A state-changing action finished or was refused. The notice has been
    /// published.
    Notice(Notice),
    /// The highest bid request finished or was refused.
    Fetch(FetchOutcome),
}

impl Outcome {
    fn refused(notice: Notice) -> Self {
        match notice.action {
            Action::FetchHighestBid => Outcome::Fetch(FetchOutcome::Aborted),
            _ => Outcome::Notice(notice),
        }
    }

    pub fn notice(self) -> Option<Notice> {
        match self {
            Outcome::Notice(notice) => Some(notice),
            Outcome::Fetch(_) => None,
        }
    }

    pub fn fetch(&self) -> Option<FetchOutcome> {
        match self {
            Outcome::Fetch(outcome) => Some(*outcome),
            Outcome::Notice(_) => None,
        }
    }
}

enum Call {
    CreateAuction(CreateAuctionParams),
    PlaceBid(PlaceBidParams),
    FetchHighestBid(BigUint),
    EndAuction(BigUint),
    WithdrawBid(BigUint),
}

/// An action whose inputs are converted and whose request token is issued.
/// Only the contract call is left.
struct Prepared<B: Backend> {
    session: Arc<Session<B>>,
    token: RequestToken,
    call: Call,
}

pub struct AuctionPanel<B: Backend> {
    connection: ConnectionState<B>,
    input_mode: InputMode,
    form: RwLock<AuctionForm>,
    highest_bid: RwLock<HighestBidView>,
    tokens: RequestTokens,
    notifier: Notifier,
}

impl<B: Backend> AuctionPanel<B> {
    pub fn new(connection: ConnectionState<B>, input_mode: InputMode) -> (Self, NoticeReceiver) {
        let (notifier, receiver) = Notifier::channel();
        let panel = Self {
            connection,
            input_mode,
            form: RwLock::new(AuctionForm::default()),
            highest_bid: RwLock::new(HighestBidView::default()),
            tokens: RequestTokens::default(),
            notifier,
        };
        (panel, receiver)
    }

    pub fn connection(&self) -> &ConnectionState<B> {
        &self.connection
    }

    pub async fn form(&self) -> AuctionForm {
        self.form.read().await.clone()
    }

    pub async fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.form.write().await.set(field, value);
    }

    pub async fn update_form(&self, update: impl FnOnce(&mut AuctionForm)) {
        update(&mut *self.form.write().await);
    }

    pub async fn highest_bid(&self) -> HighestBidView {
        self.highest_bid.read().await.clone()
    }

    /// Read the form and issue the request token on the calling task, then
    /// make the contract call on a spawned task.
    ///
    /// Request tokens follow the order of `dispatch` calls no matter how the
    /// spawned calls get scheduled. Returns `None` when the action was refused
    /// before any call.
    pub async fn dispatch(self: Arc<Self>, action: Action) -> Option<JoinHandle<Outcome>> {
        let prepared = self.prepare(action).await.ok()?;
        Some(tokio::spawn(async move { self.execute(prepared).await }))
    }

    /// Run an action to completion on the current task.
    pub async fn run(&self, action: Action) -> Outcome {
        match self.prepare(action).await {
            Ok(prepared) => self.execute(prepared).await,
            Err(outcome) => outcome,
        }
    }

    pub async fn create_auction(&self) -> Outcome {
        self.run(Action::CreateAuction).await
    }

    pub async fn place_bid(&self) -> Outcome {
        self.run(Action::PlaceBid).await
    }

    /// Query the current highest bid and write it to the view.
    ///
    /// Only the most recently issued request may touch the view; responses of
    /// earlier requests are dropped whenever they arrive.
    pub async fn fetch_highest_bid(&self) -> Outcome {
        self.run(Action::FetchHighestBid).await
    }

    pub async fn end_auction(&self) -> Outcome {
        self.run(Action::EndAuction).await
    }

    pub async fn withdraw_bid(&self) -> Outcome {
        self.run(Action::WithdrawBid).await
    }

    async fn prepare(&self, action: Action) -> Result<Prepared<B>, Outcome> {
        let session = match self.session(action) {
            Some(session) => session,
            None => {
                let notice = self.publish(Notice::not_initialized(action));
                return Err(Outcome::refused(notice));
            }
        };

        let form = self.form().await;
        let call = self.call(action, &form);

        // A refused fetch still supersedes the ones in flight
        let fetch_token = match action {
            Action::FetchHighestBid => Some(self.begin_fetch(&call).await),
            _ => None,
        };

        let call = match call {
            Ok(call) => call,
            Err(err) => return Err(Outcome::refused(self.reject_input(action, err))),
        };
        let token = match fetch_token {
            Some(token) => token,
            None => self.tokens.issue(action),
        };

        Ok(Prepared {
            session,
            token,
            call,
        })
    }

    async fn execute(&self, prepared: Prepared<B>) -> Outcome {
        let Prepared {
            session,
            token,
            call,
        } = prepared;
        let contract = &session.contract;

        let result = match call {
            Call::CreateAuction(params) => contract.create_auction(&params).await,
            Call::PlaceBid(params) => contract.place_bid(&params).await,
            Call::FetchHighestBid(nft_id) => {
                let result = contract.get_current_highest_bid(&nft_id).await;
                return Outcome::Fetch(self.resolve_fetch(token, &nft_id, result).await);
            }
            Call::EndAuction(nft_id) => contract.end_auction(&nft_id).await,
            Call::WithdrawBid(nft_id) => contract.withdraw_bid(&nft_id).await,
        };
        Outcome::Notice(self.finish(token, result))
    }

    fn session(&self, action: Action) -> Option<Arc<Session<B>>> {
        let session = self.connection.session().cloned();
        if session.is_none() {
            warn!(action = action.entry_point(), "contract not initialized");
        }
        session
    }

    fn call(&self, action: Action, form: &AuctionForm) -> Result<Call, InputError> {
        let nft_id = self.convert(form, FormField::NftId)?;
        let call = match action {
            Action::CreateAuction => Call::CreateAuction(CreateAuctionParams {
                nft_id,
                start_price: self.convert(form, FormField::StartPrice)?,
                auction_duration: self.convert(form, FormField::AuctionDuration)?,
            }),
            Action::PlaceBid => Call::PlaceBid(PlaceBidParams {
                nft_id,
                bid_amount: self.convert(form, FormField::BidAmount)?,
            }),
            Action::FetchHighestBid => Call::FetchHighestBid(nft_id),
            Action::EndAuction => Call::EndAuction(nft_id),
            Action::WithdrawBid => Call::WithdrawBid(nft_id),
        };
        Ok(call)
    }

    fn convert(&self, form: &AuctionForm, field: FormField) -> Result<BigUint, InputError> {
        self.input_mode.convert(field, form.get(field))
    }

    /// Token issue and view update happen under the view lock so a later
    /// request can never be overtaken by this one.
    async fn begin_fetch(&self, call: &Result<Call, InputError>) -> RequestToken {
        let mut view = self.highest_bid.write().await;
        match call {
            Ok(_) => view.begin(),
            Err(err) => view.fail(err.to_string()),
        }
        self.tokens.issue(Action::FetchHighestBid)
    }

    async fn resolve_fetch(
        &self,
        token: RequestToken,
        nft_id: &BigUint,
        result: CallResult<HighestBid>,
    ) -> FetchOutcome {
        let mut view = self.highest_bid.write().await;
        if !self.tokens.is_current(&token) {
            debug!(
                generation = token.generation,
                %nft_id,
                "discarding stale highest bid response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(bid) => {
                info!(%nft_id, bidder = %bid.bidder, amount = %bid.amount, "fetched highest bid");
                view.resolve(&bid);
            }
            Err(err) => {
                error!(%nft_id, %err, "error fetching highest bid");
                view.fail(err.to_string());
            }
        }
        FetchOutcome::Applied
    }

    fn reject_input(&self, action: Action, err: InputError) -> Notice {
        warn!(action = action.entry_point(), field = %err.field(), %err, "invalid input");
        self.publish(Notice::invalid(action, &err))
    }

    fn finish(&self, token: RequestToken, result: CallResult<Submitted>) -> Notice {
        let action = token.action;
        let superseded = !self.tokens.is_current(&token);
        let notice = match result {
            Ok(submitted) => {
                info!(
                    action = action.entry_point(),
                    transaction_hash = %submitted.transaction_hash,
                    "transaction submitted"
                );
                Notice::success(action, submitted)
            }
            Err(err) => {
                error!(action = action.entry_point(), %err, "contract call failed");
                Notice::failure(action, err.to_string())
            }
        };
        self.publish(notice.superseded(superseded))
    }

    fn publish(&self, notice: Notice) -> Notice {
        self.notifier.publish(notice.clone());
        notice
    }
}
