//! # Shared Types Crate
//!
//! Ledger-level types shared by every component that authorizes
//! transactions: entity identifiers, the recursive [`Key`] model, transaction
//! bodies, signature maps and the signed-transaction envelope.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Keys and transaction bodies are defined once
//!   here and consumed by the signing-requirements engine and its callers.
//! - **Owned Trees**: Keys are a sum type over an owned tree; no shared or
//!   interior-mutable state.
//! - **Signed Bytes Are Opaque**: The body bytes inside a
//!   [`SignedTransaction`] are the exact bytes that were signed and are never
//!   re-encoded before verification.

pub mod entities;
pub mod errors;
pub mod keys;
mod nesting;
pub mod transaction;

pub use entities::*;
pub use errors::*;
pub use keys::*;
pub use transaction::*;
