//! Client-side core of El Triunfo, a multiplayer attribute-battle card
//! game synchronized through a hosted realtime data service.
//!
//! Each participant runs one [`GameSession`]: a mirror of the shared room
//! state that drives the phase machine (waiting → triunfo → bidding →
//! playing → scoring), submits bids and plays, resolves rounds and scores
//! sets. All coordination happens through the [`store::DataStore`]
//! interface; [`store::MemoryStore`] backs the tests and the simulator.

pub mod bootstrap;
pub mod entity;
pub mod error;
pub mod game;
pub mod store;

pub use bootstrap::{init_tracing, load_dotenv};
pub use error::{GameError, StoreError};
pub use game::{GameSession, RoundResolution, SessionUpdate};
pub use store::{DataStore, MemoryStore};
