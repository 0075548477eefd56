use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{Account, AccountId, ProfessionalId, ProfessionalProfile};
use super::repository::{MarketplaceStore, UnlockCommand, UnlockWrite};
use super::service::{load_account, load_active_profile, MarketplaceError};

/// Credits spent per unlock.
pub const UNLOCK_COST: u64 = 1;

/// What confirming an unlock would do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockCheck {
    Allowed,
    AlreadyUnlocked,
    SelfUnlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockOutcome {
    Unlocked,
    AlreadyUnlocked,
    SelfUnlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockReceipt {
    pub outcome: UnlockOutcome,
    pub balance: u64,
}

/// Self and repeat unlocks are free no-ops regardless of balance.
pub fn check_unlock(
    account: &Account,
    profile: &ProfessionalProfile,
    already_unlocked: bool,
) -> Result<UnlockCheck, LedgerError> {
    if profile.is_owned_by(&account.id) {
        return Ok(UnlockCheck::SelfUnlock);
    }
    if already_unlocked {
        return Ok(UnlockCheck::AlreadyUnlocked);
    }
    if account.credits < UNLOCK_COST {
        return Err(LedgerError::InsufficientCredits {
            balance: account.credits,
        });
    }
    Ok(UnlockCheck::Allowed)
}

pub fn validate_amount(amount: i64) -> Result<u64, LedgerError> {
    u64::try_from(amount)
        .ok()
        .filter(|amount| *amount > 0)
        .ok_or(LedgerError::InvalidAmount { amount })
}

/// Credit balance and unlock grants for accounts.
pub struct CreditLedger<S> {
    store: Arc<S>,
}

impl<S> CreditLedger<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn balance(&self, account_id: &AccountId) -> Result<u64, MarketplaceError> {
        Ok(load_account(self.store.as_ref(), account_id)?.credits)
    }

    pub fn can_unlock(
        &self,
        account_id: &AccountId,
        professional_id: &ProfessionalId,
    ) -> Result<UnlockCheck, MarketplaceError> {
        let account = load_account(self.store.as_ref(), account_id)?;
        let profile = load_active_profile(self.store.as_ref(), professional_id)?;
        let already_unlocked = self
            .store
            .find_unlock(account_id, professional_id)?
            .is_some();
        Ok(check_unlock(&account, &profile, already_unlocked)?)
    }

    /// Debit one credit and grant access, or report why nothing changed.
    ///
    /// The balance check and the debit happen inside one store write, so two concurrent
    /// confirmations for the same pair debit at most once.
    pub fn confirm_unlock(
        &self,
        account_id: &AccountId,
        professional_id: &ProfessionalId,
        now: DateTime<Utc>,
    ) -> Result<UnlockReceipt, MarketplaceError> {
        let account = load_account(self.store.as_ref(), account_id)?;
        let profile = load_active_profile(self.store.as_ref(), professional_id)?;

        if profile.is_owned_by(account_id) {
            debug!(account = %account_id.0, "self unlock ignored");
            return Ok(UnlockReceipt {
                outcome: UnlockOutcome::SelfUnlock,
                balance: account.credits,
            });
        }

        let write = self.store.apply_unlock(UnlockCommand {
            account_id: account_id.clone(),
            professional_id: professional_id.clone(),
            cost: UNLOCK_COST,
            unlocked_at: now,
        })?;

        match write {
            UnlockWrite::Applied { balance } => {
                info!(
                    account = %account_id.0,
                    professional = %professional_id.0,
                    balance,
                    "profile unlocked"
                );
                Ok(UnlockReceipt {
                    outcome: UnlockOutcome::Unlocked,
                    balance,
                })
            }
            UnlockWrite::AlreadyUnlocked { balance } => {
                debug!(
                    account = %account_id.0,
                    professional = %professional_id.0,
                    "profile already unlocked"
                );
                Ok(UnlockReceipt {
                    outcome: UnlockOutcome::AlreadyUnlocked,
                    balance,
                })
            }
            UnlockWrite::InsufficientBalance { balance } => {
                Err(LedgerError::InsufficientCredits { balance }.into())
            }
        }
    }

    pub fn add_credits(
        &self,
        account_id: &AccountId,
        amount: i64,
    ) -> Result<u64, MarketplaceError> {
        let amount = validate_amount(amount)?;
        let balance = self.store.apply_credit(account_id, amount)?;
        info!(account = %account_id.0, amount, balance, "credits added");
        Ok(balance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("not enough credits: balance is {balance}, an unlock costs 1 credit")]
    InsufficientCredits { balance: u64 },
    #[error("credit amount must be a positive integer (got {amount})")]
    InvalidAmount { amount: i64 },
}
