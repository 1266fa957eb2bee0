//! Positions module - domain models and traits.

mod positions_model;
mod positions_traits;

// Re-export the public interface
pub use positions_model::{NewPosition, Position};
pub use positions_traits::PositionRepositoryTrait;
