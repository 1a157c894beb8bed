//! # Ledger Entity Identifiers
//!
//! Identifiers for every entity category a transaction can reference.
//!
//! ## Categories
//!
//! - **Accounts**: payers, senders, receivers, auto-renew accounts
//! - **Files**: entities guarded by a WACL key
//! - **Contracts**: entities guarded by an admin key (or immutable)
//! - **Topics**: consensus topics with optional admin/submit keys
//! - **Schedules**: deferred transactions collecting signatures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines a `shard.realm.num` identifier type.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        pub struct $name {
            /// Shard number.
            pub shard: u64,
            /// Realm number.
            pub realm: u64,
            /// Entity number within the realm.
            pub num: u64,
        }

        impl $name {
            /// Create an id in shard 0, realm 0.
            pub const fn new(num: u64) -> Self {
                Self {
                    shard: 0,
                    realm: 0,
                    num,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }
    };
}

entity_id!(
    /// A crypto account.
    AccountId
);
entity_id!(
    /// A file guarded by a WACL.
    FileId
);
entity_id!(
    /// A smart contract instance.
    ContractId
);
entity_id!(
    /// A consensus topic.
    TopicId
);
entity_id!(
    /// A schedule entity holding a deferred transaction.
    ScheduleId
);

/// Any entity a signing requirement can be traced back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// An account.
    Account(AccountId),
    /// A file.
    File(FileId),
    /// A contract.
    Contract(ContractId),
    /// A topic.
    Topic(TopicId),
    /// A schedule.
    Schedule(ScheduleId),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account {id}"),
            Self::File(id) => write!(f, "file {id}"),
            Self::Contract(id) => write!(f, "contract {id}"),
            Self::Topic(id) => write!(f, "topic {id}"),
            Self::Schedule(id) => write!(f, "schedule {id}"),
        }
    }
}

impl From<AccountId> for EntityId {
    fn from(id: AccountId) -> Self {
        Self::Account(id)
    }
}

impl From<FileId> for EntityId {
    fn from(id: FileId) -> Self {
        Self::File(id)
    }
}

impl From<ContractId> for EntityId {
    fn from(id: ContractId) -> Self {
        Self::Contract(id)
    }
}

impl From<TopicId> for EntityId {
    fn from(id: TopicId) -> Self {
        Self::Topic(id)
    }
}

impl From<ScheduleId> for EntityId {
    fn from(id: ScheduleId) -> Self {
        Self::Schedule(id)
    }
}
