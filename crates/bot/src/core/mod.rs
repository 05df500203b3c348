pub mod data_source;
pub mod emergency_stop;
pub mod indicators;
pub mod price_history;
pub mod risk;
pub mod signal_engine;
pub mod strategy;
