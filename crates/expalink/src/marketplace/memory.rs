use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Account, AccountId, ProfessionalId, ProfessionalProfile, Review, ReviewId, Unlock,
};
use super::repository::{
    LedgerStore, Repository, RepositoryError, StatsStore, UnlockCommand, UnlockWrite,
};
use super::reviews::RatingSummary;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    professionals: HashMap<ProfessionalId, ProfessionalProfile>,
    reviews: HashMap<ReviewId, Review>,
    unlocks: BTreeMap<(AccountId, ProfessionalId), Unlock>,
}

/// Process-local store. All tables sit behind one lock so ledger writes are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl Repository<Account> for InMemoryStore {
    fn get(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.lock()?.accounts.get(id).cloned())
    }

    fn upsert(&self, entity: Account) -> Result<Account, RepositoryError> {
        self.lock()?
            .accounts
            .insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    fn query(&self, filter: &dyn Fn(&Account) -> bool) -> Result<Vec<Account>, RepositoryError> {
        let tables = self.lock()?;
        let mut matches: Vec<Account> = tables
            .accounts
            .values()
            .filter(|account| filter(account))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }
}

impl Repository<ProfessionalProfile> for InMemoryStore {
    fn get(&self, id: &ProfessionalId) -> Result<Option<ProfessionalProfile>, RepositoryError> {
        Ok(self.lock()?.professionals.get(id).cloned())
    }

    fn upsert(
        &self,
        mut entity: ProfessionalProfile,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        let mut tables = self.lock()?;
        if let Some(stored) = tables.professionals.get(&entity.id) {
            entity.stats = stored.stats.clone();
        }
        tables
            .professionals
            .insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    fn query(
        &self,
        filter: &dyn Fn(&ProfessionalProfile) -> bool,
    ) -> Result<Vec<ProfessionalProfile>, RepositoryError> {
        let tables = self.lock()?;
        let mut matches: Vec<ProfessionalProfile> = tables
            .professionals
            .values()
            .filter(|profile| filter(profile))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }
}

impl Repository<Review> for InMemoryStore {
    fn get(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(self.lock()?.reviews.get(id).cloned())
    }

    fn upsert(&self, entity: Review) -> Result<Review, RepositoryError> {
        self.lock()?.reviews.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    fn query(&self, filter: &dyn Fn(&Review) -> bool) -> Result<Vec<Review>, RepositoryError> {
        let tables = self.lock()?;
        let mut matches: Vec<Review> = tables
            .reviews
            .values()
            .filter(|review| filter(review))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }
}

impl LedgerStore for InMemoryStore {
    fn apply_unlock(&self, command: UnlockCommand) -> Result<UnlockWrite, RepositoryError> {
        let mut tables = self.lock()?;
        let tables = &mut *tables;

        let account = tables
            .accounts
            .get_mut(&command.account_id)
            .ok_or(RepositoryError::NotFound)?;
        let key = (command.account_id.clone(), command.professional_id.clone());
        if tables.unlocks.contains_key(&key) {
            return Ok(UnlockWrite::AlreadyUnlocked {
                balance: account.credits,
            });
        }
        let professional = tables
            .professionals
            .get_mut(&command.professional_id)
            .ok_or(RepositoryError::NotFound)?;
        if account.credits < command.cost {
            return Ok(UnlockWrite::InsufficientBalance {
                balance: account.credits,
            });
        }

        account.credits -= command.cost;
        professional.stats.unlocks += 1;
        tables.unlocks.insert(
            key,
            Unlock {
                account_id: command.account_id,
                professional_id: command.professional_id,
                unlocked_at: command.unlocked_at,
                has_reviewed: false,
            },
        );

        Ok(UnlockWrite::Applied {
            balance: account.credits,
        })
    }

    fn apply_credit(&self, account: &AccountId, amount: u64) -> Result<u64, RepositoryError> {
        let mut tables = self.lock()?;
        let record = tables
            .accounts
            .get_mut(account)
            .ok_or(RepositoryError::NotFound)?;
        record.credits = record.credits.saturating_add(amount);
        Ok(record.credits)
    }

    fn find_unlock(
        &self,
        account: &AccountId,
        professional: &ProfessionalId,
    ) -> Result<Option<Unlock>, RepositoryError> {
        let key = (account.clone(), professional.clone());
        Ok(self.lock()?.unlocks.get(&key).cloned())
    }

    fn unlocks_for(&self, account: &AccountId) -> Result<Vec<Unlock>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .unlocks
            .values()
            .filter(|unlock| &unlock.account_id == account)
            .cloned()
            .collect())
    }

    fn set_reviewed(
        &self,
        account: &AccountId,
        professional: &ProfessionalId,
        reviewed: bool,
    ) -> Result<(), RepositoryError> {
        let key = (account.clone(), professional.clone());
        let mut tables = self.lock()?;
        let unlock = tables
            .unlocks
            .get_mut(&key)
            .ok_or(RepositoryError::NotFound)?;
        unlock.has_reviewed = reviewed;
        Ok(())
    }
}

impl StatsStore for InMemoryStore {
    fn record_view(
        &self,
        professional: &ProfessionalId,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        let mut tables = self.lock()?;
        let profile = tables
            .professionals
            .get_mut(professional)
            .ok_or(RepositoryError::NotFound)?;
        profile.stats.views = profile.stats.views.saturating_add(1);
        Ok(profile.clone())
    }

    fn record_rating(
        &self,
        professional: &ProfessionalId,
        summary: RatingSummary,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        let mut tables = self.lock()?;
        let profile = tables
            .professionals
            .get_mut(professional)
            .ok_or(RepositoryError::NotFound)?;
        profile.stats.rating = summary.rating;
        profile.stats.review_count = summary.review_count;
        Ok(profile.clone())
    }
}
