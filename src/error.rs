//! Error taxonomy for the game core.
//!
//! Precondition violations (wrong phase, not your turn, already bid, ...)
//! are non-fatal notices for the acting user; store failures are local and
//! retryable; deck/catalog problems abort a start-game attempt.

use thiserror::Error;
use uuid::Uuid;

use crate::entity::RoomPhase;

/// Failures a remote data-service call can produce.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found in {table}")]
    NotFound { table: &'static str },
    #[error("data service error: {0}")]
    Backend(String),
    #[error("change stream closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("room is in {found} phase, expected {expected}")]
    PhaseMismatch {
        expected: RoomPhase,
        found: RoomPhase,
    },
    #[error("it's not your turn: position {expected} acts next, you are {position}")]
    NotYourTurn { expected: usize, position: usize },
    #[error("attribute already selected for this round")]
    AttributeAlreadySet,
    #[error("the round starter must select an attribute first")]
    AttributeNotSelected,
    #[error("you have already bid this set")]
    AlreadyBid,
    #[error("bid {bid} is out of range 0..={max}")]
    BidOutOfRange { bid: i32, max: i32 },
    #[error("card {0} is not in your unplayed hand")]
    CardNotInHand(Uuid),
    #[error("only the host can do that")]
    NotHost,
    #[error("a set start is already in progress")]
    StartInProgress,
    #[error("need at least 2 players to start, have {found}")]
    NotEnoughPlayers { found: usize },
    #[error("deck must hold exactly {expected} cards, found {found}")]
    InvalidDeck { expected: usize, found: usize },
    #[error("no card distribution for {0} players")]
    UnsupportedPlayerCount(usize),
    #[error("game has ended ({})", .reason.as_deref().unwrap_or("no reason given"))]
    RoomEnded { reason: Option<String> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError {
    /// Whether this is a user-visible precondition notice (state unchanged,
    /// the user simply may not act yet) rather than a real failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GameError::PhaseMismatch { .. }
                | GameError::NotYourTurn { .. }
                | GameError::AttributeAlreadySet
                | GameError::AttributeNotSelected
                | GameError::AlreadyBid
                | GameError::BidOutOfRange { .. }
                | GameError::CardNotInHand(_)
                | GameError::NotHost
                | GameError::StartInProgress
                | GameError::NotEnoughPlayers { .. }
        )
    }
}
