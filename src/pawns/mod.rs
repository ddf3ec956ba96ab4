//! Occupiers and the players that own them.
//!
//! - `meeple`: `Meeple`, `Role`, `ContainerRef` and the `OccupierContainer`
//!   capability implemented by feature graphs and monasteries
//! - `player`: score and the fixed meeple pool of one seat

pub mod meeple;
pub mod player;

pub use meeple::{ContainerRef, Meeple, OccupierContainer, Role};
pub use player::Player;
