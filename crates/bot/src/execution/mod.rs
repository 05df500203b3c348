pub mod chain_client;
pub mod contracts;
pub mod trader;
