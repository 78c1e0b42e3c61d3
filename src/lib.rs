pub mod client;
pub mod error;
pub mod filter;
pub mod hub;
pub mod matcher;
pub mod model;
pub mod proto;
pub mod server;
pub mod store;
