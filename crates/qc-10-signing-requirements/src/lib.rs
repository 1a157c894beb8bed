//! # Signing Requirements Subsystem (QC-10)
//!
//! Decides whether an incoming transaction is authorized: which keys must
//! have signed it, which signatures it carries for those keys, whether the
//! signatures verify, and whether each (possibly nested) key is active.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Resolution, sourcing, verification and
//!   activation logic
//! - **Ports Layer** (`ports/`): The public API and the ledger views it needs
//! - **Adapters Layer** (`adapters/`): In-memory ledger views
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Pipeline
//!
//! ```text
//! SignedTxnAccessor ──→ SigRequirements ──→ PubKeyToSigBytes ──→ create_ed25519_signatures
//!                            │                                              │
//!                     SigMetadataLookup                              SyncVerifier
//!                                                                           │
//!                                              verdict ←── is_active ←──────┘
//! ```
//!
//! ## Security Notes
//!
//! - Only `ONLY_IF_SIG_IS_VALID` may authorize; the permissive policy is
//!   for evaluations that run before verification finishes
//! - A missing or invalid signature is a `false` verdict, never an error
//! - Contract-id keys are never satisfied by a signature

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::in_memory::{InMemoryScheduleSigs, InMemorySigMetadataLookup};
pub use config::{ResolverConfig, SigRequirementsConfig};
pub use domain::accessor::SignedTxnAccessor;
pub use domain::activation::{
    is_active, status_map_from, ActivationPolicy, IfSigNotInvalid, KeyActivation,
    OnlyIfSigIsValid, IF_SIG_NOT_INVALID, ONLY_IF_SIG_IS_VALID,
};
pub use domain::entities::{RequiredKey, SignatureType, TransactionSignature, VerificationStatus};
pub use domain::errors::{
    HandleSigsError, PrecheckError, SigCreationError, SigMapError, VerifierError,
};
pub use domain::handle::{HandleSigsVerdict, HandleSigsVerifier};
pub use domain::platform_sigs::{
    create_ed25519_signatures, BodySigningSigFactory, PlatformSigsCreationResult,
    TxnScopedPlatformSigFactory,
};
pub use domain::precheck::{query_payment_test_for, PrecheckVerifier};
pub use domain::sig_bytes::{
    sig_bytes_provider_for, unaccumulated_sig_bytes_provider_for, AccumulatedSigBytes,
    ChainedSigBytes, DefaultSigBytesProvider, PubKeyToSigBytes, PubKeyToSigBytesProvider,
    ScheduledSigBytesProvider, SigMapPubKeyToSigBytes, VerifyingSigBytes,
};
pub use domain::sig_requirements::SigRequirements;
pub use domain::signing_order::{
    CodeOrderResultFactory, KeyOrderingFailure, SigningOrderError, SigningOrderResult,
    SigningOrderResultFactory,
};
pub use domain::verifier::{BatchSyncVerifier, SyncVerifier};
pub use ports::inbound::SigningRequirementsApi;
pub use ports::outbound::{
    AccountSigningMetadata, ContractSigningMetadata, FileSigningMetadata, LookupFailure,
    ScheduleSigAccumulator, ScheduleSigningMetadata, SigMetadataLookup, TopicSigningMetadata,
};
pub use service::SigRequirementsService;
