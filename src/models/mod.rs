pub mod error;
pub mod gamemode;
pub mod player;
pub mod tier;

pub use error::*;
pub use gamemode::*;
pub use player::*;
pub use tier::*;
