pub mod constants;
pub mod engine;
pub mod input;
pub mod rng;
pub mod save_store;
pub mod server_protocol;
pub mod types;
pub mod world;
