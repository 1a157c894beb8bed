//! Fuzz target for key decoding and activation.
//!
//! Arbitrary bytes must either fail to decode or produce a key whose
//! evaluation terminates without panicking.
//!
//! ## Running
//!
//! ```bash
//! cd crates/qc-10-signing-requirements
//! cargo +nightly fuzz run fuzz_key_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use qc_10_signing_requirements::{is_active, VerificationStatus, IF_SIG_NOT_INVALID};
use shared_types::{Key, MAX_KEY_DEPTH};

fuzz_target!(|data: &[u8]| {
    let Ok(key) = Key::from_bytes(data) else {
        return;
    };

    assert!(key.depth() <= MAX_KEY_DEPTH);

    // Re-encoding a decoded key must round-trip.
    let encoded = key.to_bytes().expect("decoded key re-encodes");
    assert_eq!(Key::from_bytes(&encoded).as_ref(), Ok(&key));

    // Every leaf signed: activation only depends on structure.
    let _ = is_active(&key, |_| Some(VerificationStatus::Valid), &IF_SIG_NOT_INVALID);
    let _ = key.is_valid();
});
