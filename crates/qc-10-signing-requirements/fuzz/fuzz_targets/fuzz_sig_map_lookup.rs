//! Fuzz target for signature-map decoding and prefix lookup.
//!
//! ## Running
//!
//! ```bash
//! cd crates/qc-10-signing-requirements
//! cargo +nightly fuzz run fuzz_sig_map_lookup
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use qc_10_signing_requirements::{PubKeyToSigBytes, SigMapError, SigMapPubKeyToSigBytes};

/// Fuzz input: raw map bytes and a public key to look up.
#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    sig_map_bytes: Vec<u8>,
    public_key: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let lookup = SigMapPubKeyToSigBytes::from_bytes(&input.sig_map_bytes);

    match lookup.sig_bytes_for(&input.public_key) {
        Ok(_) => assert!(lookup.is_well_formed()),
        Err(SigMapError::Malformed(_)) => assert!(!lookup.is_well_formed()),
    }
});
