use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::marketplace::domain::{
    Account, AccountId, Coordinates, Gender, ProfessionalId, ProfessionalProfile, Review, ReviewId,
    Role, Unlock,
};
use crate::marketplace::repository::{
    LedgerStore, Repository, RepositoryError, StatsStore, UnlockCommand, UnlockWrite,
};
use crate::marketplace::reviews::RatingSummary;
use crate::marketplace::translation::{TextGenerator, TranslationError};
use crate::marketplace::{InMemoryStore, MarketplacePolicy, MarketplaceService};

pub(super) type TestService = MarketplaceService<InMemoryStore, StubTranslator>;

pub(super) const EXPAT: &str = "expat-1";
pub(super) const PRO: &str = "pro-1";
pub(super) const ADMIN: &str = "admin-1";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn account_id(id: &str) -> AccountId {
    AccountId(id.to_string())
}

pub(super) fn professional_id(id: &str) -> ProfessionalId {
    ProfessionalId(id.to_string())
}

/// Listing that scores 100 on completion.
pub(super) fn complete_profile(owner: &str, name: &str) -> ProfessionalProfile {
    let mut profile = ProfessionalProfile::new(account_id(owner), name, now());
    profile.identity.company_name = Some(format!("{name} Consulting"));
    profile.identity.gender = Gender::Female;
    profile.identity.nationalities = vec!["Spanish".to_string()];
    profile.identity.image_url = Some(format!("https://cdn.expalink.example/{owner}.jpg"));
    profile.contact.phone = Some("+34 611 222 333".to_string());
    profile.contact.email = Some(format!("{owner}@expalink.example"));
    profile.contact.address = Some("Calle de Alcalá 50, Madrid".to_string());
    profile.contact.coordinates = Some(Coordinates::new(40.4190, -3.6960));
    profile.expertise.professions = vec!["Lawyer".to_string()];
    profile.expertise.specialties = vec!["Residency permits".to_string()];
    profile.expertise.years_of_experience = Some(9);
    profile.expertise.bio =
        "Immigration lawyer helping newcomers with NIE, residency and family reunification."
            .to_string();
    profile.expertise.languages = vec!["English".to_string(), "Spanish".to_string()];
    profile.expertise.cities = vec!["Madrid".to_string()];
    profile
}

pub(super) fn account(id: &str, role: Role, credits: u64) -> Account {
    let mut account = Account::new(id, role, now());
    account.credits = credits;
    account
}

/// Store seeded with one expat, one complete pro listing and one admin.
pub(super) fn seeded_store(expat_credits: u64) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    Repository::<Account>::upsert(store.as_ref(), account(EXPAT, Role::Expat, expat_credits))
        .expect("seed expat");
    Repository::<Account>::upsert(store.as_ref(), account(PRO, Role::Pro, 0)).expect("seed pro");
    let mut admin = account(ADMIN, Role::Expat, 0);
    admin.is_admin = true;
    Repository::<Account>::upsert(store.as_ref(), admin).expect("seed admin");
    Repository::<ProfessionalProfile>::upsert(store.as_ref(), complete_profile(PRO, "Lucía Gómez"))
        .expect("seed profile");
    store
}

pub(super) fn build_service(
    expat_credits: u64,
) -> (TestService, Arc<InMemoryStore>, Arc<StubTranslator>) {
    let store = seeded_store(expat_credits);
    let translator = Arc::new(StubTranslator::failing());
    let service = MarketplaceService::new(
        Arc::clone(&store),
        Arc::clone(&translator),
        MarketplacePolicy::default(),
    );
    (service, store, translator)
}

pub(super) fn stored_profile(store: &InMemoryStore, id: &str) -> ProfessionalProfile {
    Repository::<ProfessionalProfile>::get(store, &professional_id(id))
        .expect("fetch succeeds")
        .expect("profile present")
}

pub(super) fn stored_account(store: &InMemoryStore, id: &str) -> Account {
    Repository::<Account>::get(store, &account_id(id))
        .expect("fetch succeeds")
        .expect("account present")
}

/// Text generator returning a canned response and recording the bios it was asked for.
#[derive(Default)]
pub(super) struct StubTranslator {
    response: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl StubTranslator {
    pub(super) fn failing() -> Self {
        Self::default()
    }

    pub(super) fn returning(raw: &str) -> Self {
        Self {
            response: Some(raw.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("translator mutex poisoned").clone()
    }
}

impl TextGenerator for StubTranslator {
    fn translate_profile(
        &self,
        bio: &str,
        _specialties: &[String],
        _languages: &[&str],
    ) -> Result<String, TranslationError> {
        self.requests
            .lock()
            .expect("translator mutex poisoned")
            .push(bio.to_string());
        self.response
            .clone()
            .ok_or_else(|| TranslationError::Unavailable("offline".to_string()))
    }
}

/// Store whose every call fails as if the backing database were down.
#[derive(Default)]
pub(super) struct UnavailableStore;

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl Repository<Account> for UnavailableStore {
    fn get(&self, _id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        Err(unavailable())
    }

    fn upsert(&self, _entity: Account) -> Result<Account, RepositoryError> {
        Err(unavailable())
    }

    fn query(&self, _filter: &dyn Fn(&Account) -> bool) -> Result<Vec<Account>, RepositoryError> {
        Err(unavailable())
    }
}

impl Repository<ProfessionalProfile> for UnavailableStore {
    fn get(&self, _id: &ProfessionalId) -> Result<Option<ProfessionalProfile>, RepositoryError> {
        Err(unavailable())
    }

    fn upsert(&self, _entity: ProfessionalProfile) -> Result<ProfessionalProfile, RepositoryError> {
        Err(unavailable())
    }

    fn query(
        &self,
        _filter: &dyn Fn(&ProfessionalProfile) -> bool,
    ) -> Result<Vec<ProfessionalProfile>, RepositoryError> {
        Err(unavailable())
    }
}

impl Repository<Review> for UnavailableStore {
    fn get(&self, _id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        Err(unavailable())
    }

    fn upsert(&self, _entity: Review) -> Result<Review, RepositoryError> {
        Err(unavailable())
    }

    fn query(&self, _filter: &dyn Fn(&Review) -> bool) -> Result<Vec<Review>, RepositoryError> {
        Err(unavailable())
    }
}

impl LedgerStore for UnavailableStore {
    fn apply_unlock(&self, _command: UnlockCommand) -> Result<UnlockWrite, RepositoryError> {
        Err(unavailable())
    }

    fn apply_credit(&self, _account: &AccountId, _amount: u64) -> Result<u64, RepositoryError> {
        Err(unavailable())
    }

    fn find_unlock(
        &self,
        _account: &AccountId,
        _professional: &ProfessionalId,
    ) -> Result<Option<Unlock>, RepositoryError> {
        Err(unavailable())
    }

    fn unlocks_for(&self, _account: &AccountId) -> Result<Vec<Unlock>, RepositoryError> {
        Err(unavailable())
    }

    fn set_reviewed(
        &self,
        _account: &AccountId,
        _professional: &ProfessionalId,
        _reviewed: bool,
    ) -> Result<(), RepositoryError> {
        Err(unavailable())
    }
}

impl StatsStore for UnavailableStore {
    fn record_view(
        &self,
        _professional: &ProfessionalId,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        Err(unavailable())
    }

    fn record_rating(
        &self,
        _professional: &ProfessionalId,
        _summary: RatingSummary,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        Err(unavailable())
    }
}

/// Store that commits a queued unlock right after the next profile read, so the caller
/// works from a copy that is already stale when it writes.
pub(super) struct InterleavingStore {
    inner: InMemoryStore,
    queued: Mutex<Option<UnlockCommand>>,
}

impl InterleavingStore {
    pub(super) fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            queued: Mutex::new(None),
        }
    }

    pub(super) fn unlock_after_next_read(&self, account: &str, professional: &str) {
        *self.queued.lock().expect("queue mutex poisoned") = Some(UnlockCommand {
            account_id: account_id(account),
            professional_id: professional_id(professional),
            cost: 1,
            unlocked_at: now(),
        });
    }

    fn commit_queued(&self) -> Result<(), RepositoryError> {
        let queued = self.queued.lock().expect("queue mutex poisoned").take();
        if let Some(command) = queued {
            self.inner.apply_unlock(command)?;
        }
        Ok(())
    }
}

impl Repository<Account> for InterleavingStore {
    fn get(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        Repository::<Account>::get(&self.inner, id)
    }

    fn upsert(&self, entity: Account) -> Result<Account, RepositoryError> {
        Repository::<Account>::upsert(&self.inner, entity)
    }

    fn query(&self, filter: &dyn Fn(&Account) -> bool) -> Result<Vec<Account>, RepositoryError> {
        Repository::<Account>::query(&self.inner, filter)
    }
}

impl Repository<ProfessionalProfile> for InterleavingStore {
    fn get(&self, id: &ProfessionalId) -> Result<Option<ProfessionalProfile>, RepositoryError> {
        let profile = Repository::<ProfessionalProfile>::get(&self.inner, id)?;
        self.commit_queued()?;
        Ok(profile)
    }

    fn upsert(&self, entity: ProfessionalProfile) -> Result<ProfessionalProfile, RepositoryError> {
        Repository::<ProfessionalProfile>::upsert(&self.inner, entity)
    }

    fn query(
        &self,
        filter: &dyn Fn(&ProfessionalProfile) -> bool,
    ) -> Result<Vec<ProfessionalProfile>, RepositoryError> {
        let profiles = Repository::<ProfessionalProfile>::query(&self.inner, filter)?;
        self.commit_queued()?;
        Ok(profiles)
    }
}

impl Repository<Review> for InterleavingStore {
    fn get(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        Repository::<Review>::get(&self.inner, id)
    }

    fn upsert(&self, entity: Review) -> Result<Review, RepositoryError> {
        Repository::<Review>::upsert(&self.inner, entity)
    }

    fn query(&self, filter: &dyn Fn(&Review) -> bool) -> Result<Vec<Review>, RepositoryError> {
        Repository::<Review>::query(&self.inner, filter)
    }
}

impl LedgerStore for InterleavingStore {
    fn apply_unlock(&self, command: UnlockCommand) -> Result<UnlockWrite, RepositoryError> {
        self.inner.apply_unlock(command)
    }

    fn apply_credit(&self, account: &AccountId, amount: u64) -> Result<u64, RepositoryError> {
        self.inner.apply_credit(account, amount)
    }

    fn find_unlock(
        &self,
        account: &AccountId,
        professional: &ProfessionalId,
    ) -> Result<Option<Unlock>, RepositoryError> {
        self.inner.find_unlock(account, professional)
    }

    fn unlocks_for(&self, account: &AccountId) -> Result<Vec<Unlock>, RepositoryError> {
        self.inner.unlocks_for(account)
    }

    fn set_reviewed(
        &self,
        account: &AccountId,
        professional: &ProfessionalId,
        reviewed: bool,
    ) -> Result<(), RepositoryError> {
        self.inner.set_reviewed(account, professional, reviewed)
    }
}

impl StatsStore for InterleavingStore {
    fn record_view(
        &self,
        professional: &ProfessionalId,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        self.inner.record_view(professional)
    }

    fn record_rating(
        &self,
        professional: &ProfessionalId,
        summary: RatingSummary,
    ) -> Result<ProfessionalProfile, RepositoryError> {
        self.inner.record_rating(professional, summary)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
