//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that external callers use
//! - **Outbound (Driven)**: Ledger views this subsystem needs

pub mod inbound;
pub mod outbound;
