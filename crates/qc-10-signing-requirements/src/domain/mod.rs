//! # Domain Layer
//!
//! Key resolution, signature sourcing, verification and activation logic.
//! This is the inner layer of the hexagonal architecture; ledger state is
//! reached only through the outbound ports.

pub mod accessor;
pub mod activation;
pub mod entities;
pub mod errors;
pub mod handle;
pub mod platform_sigs;
pub mod precheck;
pub mod sig_bytes;
pub mod sig_requirements;
pub mod signing_order;
pub mod verifier;
