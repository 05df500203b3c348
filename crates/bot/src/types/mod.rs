pub mod market_data;
pub mod risk;
pub mod signal;
pub mod wad;

pub use market_data::*;
pub use risk::*;
pub use signal::*;
