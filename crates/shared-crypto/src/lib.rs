//! # Shared Crypto - Signature Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Account, file, topic and schedule keys |
//! | `ecdsa` | secp256k1 | Account keys imported from EVM wallets |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **secp256k1**: RFC 6979 deterministic nonces, SHA-256 message digest
//! - Secret keys are zeroized on drop by the signing key types themselves

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod signatures;

// Re-exports
pub use ecdsa::{verify_secp256k1, Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use signatures::{verify_ed25519, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
