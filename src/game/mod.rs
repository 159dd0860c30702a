//! Game management module
//!
//! The core logic of El Triunfo: the phase state machine, bidding
//! coordinator, round resolver and scoring engine, all operating through a
//! per-client `GameSession` against the shared data store.

pub mod bidding;
pub mod dealing;
pub mod rounds;
pub mod rules;
pub mod scoring;
pub mod session;
pub mod state;

pub use dealing::{partition_deck, shuffled_positions, DealOutcome};
pub use rounds::{decide_winner, PlayOutcome, RoundResolution};
pub use scoring::{set_points, SetOutcome, SetResult};
pub use session::{GameSession, SessionUpdate};
