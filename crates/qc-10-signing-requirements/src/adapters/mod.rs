//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod in_memory;
