//! Typed records for every table the game core touches.
//!
//! The remote data service hands back loosely-shaped JSON rows; these types
//! pin the exact field sets and enum string values so parsing happens once,
//! at the data-access boundary.

pub mod cards;
pub mod hand_cards;
pub mod players;
pub mod rooms;
pub mod round_plays;
pub mod turn_order;

pub use cards::{Attribute, Card};
pub use hand_cards::{HandCard, HandRow};
pub use players::{Player, PlayerPatch};
pub use rooms::{Room, RoomPatch, RoomPhase, RoomStatus};
pub use round_plays::RoundPlay;
pub use turn_order::TurnOrderEntry;
