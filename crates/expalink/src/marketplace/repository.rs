use std::hash::Hash;

use chrono::{DateTime, Utc};

use super::domain::{
    Account, AccountId, ProfessionalId, ProfessionalProfile, Review, ReviewId, Unlock,
};
use super::reviews::RatingSummary;

/// Record addressable by a stable id.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Send + Sync;

    fn id(&self) -> &Self::Id;
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &AccountId {
        &self.id
    }
}

impl Entity for ProfessionalProfile {
    type Id = ProfessionalId;

    fn id(&self) -> &ProfessionalId {
        &self.id
    }
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> &ReviewId {
        &self.id
    }
}

/// Storage abstraction for one entity kind.
///
/// Upserting a [`ProfessionalProfile`] that already exists keeps the stored `stats`; counters
/// move only through [`StatsStore`] and [`LedgerStore::apply_unlock`].
pub trait Repository<E: Entity>: Send + Sync {
    fn get(&self, id: &E::Id) -> Result<Option<E>, RepositoryError>;
    fn upsert(&self, entity: E) -> Result<E, RepositoryError>;
    fn query(&self, filter: &dyn Fn(&E) -> bool) -> Result<Vec<E>, RepositoryError>;
}

/// Request to debit one credit and record an unlock in a single atomic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockCommand {
    pub account_id: AccountId,
    pub professional_id: ProfessionalId,
    pub cost: u64,
    pub unlocked_at: DateTime<Utc>,
}

/// Outcome of [`LedgerStore::apply_unlock`]; `balance` is the balance after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockWrite {
    Applied { balance: u64 },
    AlreadyUnlocked { balance: u64 },
    InsufficientBalance { balance: u64 },
}

/// Credit and unlock operations that must be serialized per account.
///
/// `apply_unlock` has to check uniqueness of the pair, check the balance, debit, insert the
/// unlock and bump the listing's unlock counter without interleaving with another
/// `apply_unlock` or `apply_credit` for the same account.
pub trait LedgerStore: Send + Sync {
    fn apply_unlock(&self, command: UnlockCommand) -> Result<UnlockWrite, RepositoryError>;
    /// Adds `amount` and returns the new balance.
    fn apply_credit(&self, account: &AccountId, amount: u64) -> Result<u64, RepositoryError>;
    fn find_unlock(
        &self,
        account: &AccountId,
        professional: &ProfessionalId,
    ) -> Result<Option<Unlock>, RepositoryError>;
    fn unlocks_for(&self, account: &AccountId) -> Result<Vec<Unlock>, RepositoryError>;
    fn set_reviewed(
        &self,
        account: &AccountId,
        professional: &ProfessionalId,
        reviewed: bool,
    ) -> Result<(), RepositoryError>;
}

/// Listing statistics, each written in place so concurrent profile edits cannot lose them.
pub trait StatsStore: Send + Sync {
    /// Adds one view and returns the updated listing.
    fn record_view(
        &self,
        professional: &ProfessionalId,
    ) -> Result<ProfessionalProfile, RepositoryError>;
    fn record_rating(
        &self,
        professional: &ProfessionalId,
        summary: RatingSummary,
    ) -> Result<ProfessionalProfile, RepositoryError>;
}

/// Everything the marketplace service needs from persistence.
pub trait MarketplaceStore:
    Repository<Account>
    + Repository<ProfessionalProfile>
    + Repository<Review>
    + LedgerStore
    + StatsStore
{
}

impl<T> MarketplaceStore for T where
    T: Repository<Account>
        + Repository<ProfessionalProfile>
        + Repository<Review>
        + LedgerStore
        + StatsStore
{
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
