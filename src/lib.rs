//! # Euler SDK
//!
//! Client library for the Euler lending protocol: resolves protocol contracts, compiles calls
//! into atomic `batchDispatch` batches, dry-runs them and signs token permits that can be folded
//! into the same batch.

pub mod abi;
pub mod batch;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod permit;
pub mod resolver;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::EulerClient;
pub use error::{Result, SdkError};

#[cfg(test)]
mod test_utils;
