//! Domain types for Pocket Player

mod ids;
mod track;

pub use ids::{Locator, TrackId};
pub use track::Track;
