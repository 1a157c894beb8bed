//! # Signing Requirements Configuration
//!
//! Configuration for the precheck and handle-time verifiers.

use serde::{Deserialize, Serialize};
use shared_types::AccountId;

/// Default account of the node receiving query payments.
pub const DEFAULT_NODE_ACCOUNT: AccountId = AccountId::new(3);

/// Resolver configuration for one call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Include the signers of a scheduled inner transaction when resolving
    /// `ScheduleCreate` and `ScheduleSign`.
    pub include_scheduled_signers: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            include_scheduled_signers: true,
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SigRequirementsConfig {
    /// Resolver used at ingest.
    pub precheck: ResolverConfig,

    /// Resolver used when handling consensus-ordered transactions.
    pub handle: ResolverConfig,

    /// Dedicated verification threads; 0 uses the global rayon pool.
    pub verifier_threads: usize,

    /// This node's account; query payments credit it.
    pub node_account: AccountId,
}

impl Default for SigRequirementsConfig {
    fn default() -> Self {
        Self {
            precheck: ResolverConfig {
                include_scheduled_signers: false,
            },
            handle: ResolverConfig {
                include_scheduled_signers: true,
            },
            verifier_threads: 0,
            node_account: DEFAULT_NODE_ACCOUNT,
        }
    }
}

impl SigRequirementsConfig {
    /// Create a config for testing (small dedicated pool).
    pub fn for_testing() -> Self {
        Self {
            verifier_threads: 2,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SigRequirementsConfig::default();
        assert!(!config.precheck.include_scheduled_signers);
        assert!(config.handle.include_scheduled_signers);
        assert_eq!(config.verifier_threads, 0);
        assert_eq!(config.node_account, AccountId::new(3));
    }

    #[test]
    fn test_testing_config() {
        let config = SigRequirementsConfig::for_testing();
        assert_eq!(config.verifier_threads, 2);
    }
}
