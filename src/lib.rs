pub mod config;
pub mod crypto;
pub mod error;
pub mod message;
pub mod org;
pub mod serialize;
pub mod server;
pub mod transport;
