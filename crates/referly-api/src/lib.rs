// referly-api: Async Rust client for the referly affiliate backend.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::AffiliateClient;
pub use error::Error;
