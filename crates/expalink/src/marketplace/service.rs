use std::cmp::Ordering as SortOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::completion::{self, CompletionReport};
use super::domain::{
    Account, AccountId, Coordinates, LocalizedContent, ProfessionalId, ProfessionalProfile,
    Review, ReviewId, ReviewStatus, Role,
};
use super::geo::{self, DEFAULT_ORIGIN};
use super::ledger::{CreditLedger, LedgerError, UnlockCheck, UnlockReceipt};
use super::plan::{FeaturedChange, PlanError, PlanSubscription, PlanTier};
use super::policy::MarketplacePolicy;
use super::repository::{MarketplaceStore, Repository, RepositoryError};
use super::reviews::{self, ModerationDecision, PublicReview, ReviewDraft, ReviewError};
use super::translation::{self, TextGenerator};
use super::verification::{
    VerificationError, VerificationRequest, VerificationStatus, VerificationVerdict,
};
use super::visibility::{self, Access, ProfessionalView, UnlockIndex};

/// Filters and viewer context for the professional listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Viewer location; the default origin is used when absent.
    #[serde(default)]
    pub origin: Option<Coordinates>,
    /// UI language used to pick the translated bio.
    #[serde(default)]
    pub locale: Option<String>,
}

impl SearchQuery {
    fn matches(&self, profile: &ProfessionalProfile) -> bool {
        let profession_ok = self.profession.as_deref().map_or(true, |wanted| {
            contains_ignoring_case(&profile.expertise.professions, wanted)
        });
        let language_ok = self.language.as_deref().map_or(true, |wanted| {
            contains_ignoring_case(&profile.expertise.languages, wanted)
        });
        profession_ok && language_ok
    }
}

fn contains_ignoring_case(values: &[String], wanted: &str) -> bool {
    let wanted = wanted.trim();
    wanted.is_empty()
        || values
            .iter()
            .any(|value| value.trim().eq_ignore_ascii_case(wanted))
}

/// Featured first, then nearest (unknown last), then best rated, then id.
fn rank(a: &ProfessionalView, b: &ProfessionalView) -> SortOrdering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => SortOrdering::Less,
            (None, Some(_)) => SortOrdering::Greater,
            (None, None) => SortOrdering::Equal,
        })
        .then_with(|| match (a.rating, b.rating) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => SortOrdering::Less,
            (None, Some(_)) => SortOrdering::Greater,
            (None, None) => SortOrdering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_review_id() -> ReviewId {
    let id = REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReviewId(format!("rev-{id:06}"))
}

pub(crate) fn load_account<S>(store: &S, id: &AccountId) -> Result<Account, MarketplaceError>
where
    S: MarketplaceStore,
{
    <S as Repository<Account>>::get(store, id)?.ok_or_else(|| MarketplaceError::NotFound {
        entity: "account",
        id: id.0.clone(),
    })
}

/// Existing, non-archived listing. Offline listings still resolve.
pub(crate) fn load_active_profile<S>(
    store: &S,
    id: &ProfessionalId,
) -> Result<ProfessionalProfile, MarketplaceError>
where
    S: MarketplaceStore,
{
    <S as Repository<ProfessionalProfile>>::get(store, id)?
        .filter(|profile| !profile.is_archived())
        .ok_or_else(|| MarketplaceError::NotFound {
            entity: "professional",
            id: id.0.clone(),
        })
}

/// Service composing the ledger, visibility policy, plan and review rules over one store.
pub struct MarketplaceService<S, T> {
    store: Arc<S>,
    translator: Arc<T>,
    ledger: CreditLedger<S>,
    policy: MarketplacePolicy,
}

impl<S, T> MarketplaceService<S, T>
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    pub fn new(store: Arc<S>, translator: Arc<T>, policy: MarketplacePolicy) -> Self {
        let ledger = CreditLedger::new(Arc::clone(&store));
        Self {
            store,
            translator,
            ledger,
            policy,
        }
    }

    pub fn policy(&self) -> &MarketplacePolicy {
        &self.policy
    }

    pub fn ledger(&self) -> &CreditLedger<S> {
        &self.ledger
    }

    /// Register a new account. Existing ids are rejected.
    pub fn register_account(&self, account: Account) -> Result<Account, MarketplaceError> {
        if <S as Repository<Account>>::get(self.store.as_ref(), &account.id)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }
        let stored = self.save_account(account)?;
        info!(account = %stored.id.0, role = ?stored.role, "account registered");
        Ok(stored)
    }

    pub fn account(&self, id: &AccountId) -> Result<Account, MarketplaceError> {
        load_account(self.store.as_ref(), id)
    }

    pub fn switch_role(&self, actor: &AccountId, role: Role) -> Result<Account, MarketplaceError> {
        let mut account = load_account(self.store.as_ref(), actor)?;
        if account.role == role {
            return Ok(account);
        }
        account.role = role;
        let account = self.save_account(account)?;
        info!(account = %actor.0, role = ?role, "role switched");
        Ok(account)
    }

    /// Stamp a deletion request and pull the account's listing from the marketplace.
    pub fn request_deletion(
        &self,
        actor: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Account, MarketplaceError> {
        let mut account = load_account(self.store.as_ref(), actor)?;
        if account.is_archived() {
            return Ok(account);
        }
        account.deletion_requested_at = Some(now);
        let account = self.save_account(account)?;

        if let Some(mut profile) = self.find_owned_profile(actor)? {
            profile.archived_at = Some(now);
            profile.is_online = false;
            self.save_profile(profile)?;
        }

        info!(account = %actor.0, "account deletion requested");
        Ok(account)
    }

    /// Create or edit the caller's listing.
    ///
    /// Plan, verification, counters and lifecycle stamps are server-managed and carried over
    /// from the stored record. Translations are regenerated when the bio or specialties change.
    pub fn save_own_profile(
        &self,
        actor: &AccountId,
        mut profile: ProfessionalProfile,
    ) -> Result<ProfessionalProfile, MarketplaceError> {
        let account = load_account(self.store.as_ref(), actor)?;
        if account.is_archived() {
            return Err(MarketplaceError::Forbidden("account is pending deletion"));
        }
        if !profile.is_owned_by(actor) {
            return Err(MarketplaceError::Forbidden(
                "profiles can only be edited by their owner",
            ));
        }

        let existing = self.find_owned_profile(actor)?;
        let needs_translation = match &existing {
            Some(previous) => {
                profile.id = previous.id.clone();
                profile.plan = previous.plan.clone();
                profile.verification = previous.verification.clone();
                profile.stats = previous.stats.clone();
                profile.created_at = previous.created_at;
                profile.archived_at = previous.archived_at;
                profile.localized = previous.localized.clone();
                previous.expertise.bio != profile.expertise.bio
                    || previous.expertise.specialties != profile.expertise.specialties
            }
            None => {
                profile.id = ProfessionalId(actor.0.clone());
                profile.plan = PlanSubscription::default();
                profile.verification = VerificationRequest::default();
                profile.stats = Default::default();
                profile.archived_at = None;
                true
            }
        };

        if needs_translation {
            profile.localized = translation::translate_or_passthrough(
                self.translator.as_ref(),
                &profile.expertise.bio,
                &profile.expertise.specialties,
            );
        }

        let stored = self.save_profile(profile)?;
        info!(
            professional = %stored.id.0,
            completion = completion::score(&stored),
            "profile saved"
        );
        Ok(stored)
    }

    pub fn own_profile(&self, actor: &AccountId) -> Result<ProfessionalProfile, MarketplaceError> {
        self.owned_profile(actor)
    }

    pub fn completion(&self, actor: &AccountId) -> Result<CompletionReport, MarketplaceError> {
        Ok(completion::report(&self.owned_profile(actor)?))
    }

    pub fn set_profile_online(
        &self,
        actor: &AccountId,
        online: bool,
    ) -> Result<ProfessionalProfile, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        if profile.is_archived() {
            return Err(MarketplaceError::Forbidden("archived profiles cannot be listed"));
        }
        profile.is_online = online;
        let profile = self.save_profile(profile)?;
        info!(professional = %profile.id.0, online, "profile visibility changed");
        Ok(profile)
    }

    /// Regenerate the listing's translations from its current bio and specialties.
    pub fn refresh_translations(
        &self,
        actor: &AccountId,
    ) -> Result<LocalizedContent, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        profile.localized = translation::translate_or_passthrough(
            self.translator.as_ref(),
            &profile.expertise.bio,
            &profile.expertise.specialties,
        );
        let profile = self.save_profile(profile)?;
        info!(
            professional = %profile.id.0,
            languages = profile.localized.bios.len(),
            "translations refreshed"
        );
        Ok(profile.localized)
    }

    /// Render one listing for the viewer. Views by anyone but the owner are counted.
    pub fn view_profile(
        &self,
        viewer: Option<&AccountId>,
        professional_id: &ProfessionalId,
        origin: Option<Coordinates>,
        locale: Option<&str>,
    ) -> Result<ProfessionalView, MarketplaceError> {
        let mut profile = load_active_profile(self.store.as_ref(), professional_id)?;
        let index = self.unlock_index(viewer)?;
        let access = visibility::access_for(viewer, &profile, &index);

        if access != Access::Owner {
            profile = self.store.record_view(professional_id)?;
        }

        let distance = origin.and_then(|origin| geo::distance_from(origin, &profile));
        Ok(visibility::render(&profile, access, locale, distance))
    }

    /// Online, non-archived listings matching the filters, redacted for the viewer and ranked.
    pub fn search(
        &self,
        viewer: Option<&AccountId>,
        query: &SearchQuery,
    ) -> Result<Vec<ProfessionalView>, MarketplaceError> {
        let origin = query
            .origin
            .filter(Coordinates::is_known)
            .unwrap_or(DEFAULT_ORIGIN);
        let index = self.unlock_index(viewer)?;
        let profiles = <S as Repository<ProfessionalProfile>>::query(
            self.store.as_ref(),
            &|profile: &ProfessionalProfile| profile.is_listed() && query.matches(profile),
        )?;

        let mut views: Vec<ProfessionalView> = profiles
            .iter()
            .map(|profile| {
                let access = visibility::access_for(viewer, profile, &index);
                let distance = geo::distance_from(origin, profile);
                visibility::render(profile, access, query.locale.as_deref(), distance)
            })
            .collect();
        views.sort_by(rank);

        debug!(results = views.len(), "professional search");
        Ok(views)
    }

    pub fn can_see_private_fields(
        &self,
        viewer: Option<&AccountId>,
        professional_id: &ProfessionalId,
    ) -> Result<bool, MarketplaceError> {
        let profile = load_active_profile(self.store.as_ref(), professional_id)?;
        let index = self.unlock_index(viewer)?;
        Ok(visibility::can_see_private_fields(viewer, &profile, &index))
    }

    /// Listings the caller has unlocked, most recent unlock first. Archived listings are skipped.
    pub fn unlocked_professionals(
        &self,
        actor: &AccountId,
        locale: Option<&str>,
    ) -> Result<Vec<ProfessionalView>, MarketplaceError> {
        let mut unlocks = self.store.unlocks_for(actor)?;
        unlocks.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
        let index = UnlockIndex::from_unlocks(&unlocks);

        let mut views = Vec::with_capacity(unlocks.len());
        for unlock in &unlocks {
            let Some(profile) = <S as Repository<ProfessionalProfile>>::get(
                self.store.as_ref(),
                &unlock.professional_id,
            )?
            else {
                continue;
            };
            if profile.is_archived() {
                continue;
            }
            let access = visibility::access_for(Some(actor), &profile, &index);
            views.push(visibility::render(&profile, access, locale, None));
        }
        Ok(views)
    }

    fn unlock_index(&self, viewer: Option<&AccountId>) -> Result<UnlockIndex, MarketplaceError> {
        match viewer {
            Some(account) => {
                let unlocks = self.store.unlocks_for(account)?;
                Ok(UnlockIndex::from_unlocks(&unlocks))
            }
            None => Ok(UnlockIndex::default()),
        }
    }

    pub fn balance(&self, actor: &AccountId) -> Result<u64, MarketplaceError> {
        self.ledger.balance(actor)
    }

    pub fn can_unlock(
        &self,
        actor: &AccountId,
        professional_id: &ProfessionalId,
    ) -> Result<UnlockCheck, MarketplaceError> {
        self.ledger.can_unlock(actor, professional_id)
    }

    pub fn confirm_unlock(
        &self,
        actor: &AccountId,
        professional_id: &ProfessionalId,
        now: DateTime<Utc>,
    ) -> Result<UnlockReceipt, MarketplaceError> {
        self.ledger.confirm_unlock(actor, professional_id, now)
    }

    pub fn add_credits(&self, actor: &AccountId, amount: i64) -> Result<u64, MarketplaceError> {
        self.ledger.add_credits(actor, amount)
    }

    pub fn submit_review(
        &self,
        actor: &AccountId,
        draft: ReviewDraft,
        now: DateTime<Utc>,
    ) -> Result<Review, MarketplaceError> {
        let profile = load_active_profile(self.store.as_ref(), &draft.professional_id)?;
        if self
            .store
            .find_unlock(actor, &draft.professional_id)?
            .is_none()
        {
            return Err(ReviewError::NotUnlocked.into());
        }
        reviews::validate_draft(&draft, self.policy.min_testimony_chars)?;

        let professional_id = draft.professional_id.clone();
        let active = <S as Repository<Review>>::query(self.store.as_ref(), &|review: &Review| {
            &review.author_id == actor
                && review.professional_id == professional_id
                && reviews::is_active(review)
        })?;
        if !active.is_empty() {
            return Err(ReviewError::AlreadyActive.into());
        }

        let review = reviews::open_review(
            next_review_id(),
            actor.clone(),
            draft,
            profile.primary_profession(),
            now,
        );
        let review = <S as Repository<Review>>::upsert(self.store.as_ref(), review)?;
        self.store.set_reviewed(actor, &professional_id, true)?;

        info!(
            review = %review.id.0,
            professional = %professional_id.0,
            stars = review.stars,
            "review submitted"
        );
        Ok(review)
    }

    /// Administrator decision on a pending review; refreshes the listing's rating.
    pub fn moderate_review(
        &self,
        admin: &AccountId,
        review_id: &ReviewId,
        decision: ModerationDecision,
        now: DateTime<Utc>,
    ) -> Result<Review, MarketplaceError> {
        self.require_admin(admin)?;
        let mut review = <S as Repository<Review>>::get(self.store.as_ref(), review_id)?
            .ok_or_else(|| MarketplaceError::NotFound {
                entity: "review",
                id: review_id.0.clone(),
            })?;

        reviews::moderate(&mut review, decision, now)?;
        let review = <S as Repository<Review>>::upsert(self.store.as_ref(), review)?;

        if review.status == ReviewStatus::Rejected {
            self.store
                .set_reviewed(&review.author_id, &review.professional_id, false)?;
        }
        self.refresh_rating(&review.professional_id)?;

        info!(
            review = %review.id.0,
            status = review.status.label(),
            moderator = %admin.0,
            "review moderated"
        );
        Ok(review)
    }

    pub fn pros_waiting_for_review(
        &self,
        actor: &AccountId,
    ) -> Result<Vec<ProfessionalId>, MarketplaceError> {
        let unlocks = self.store.unlocks_for(actor)?;
        let authored = <S as Repository<Review>>::query(self.store.as_ref(), &|review: &Review| {
            &review.author_id == actor
        })?;
        Ok(reviews::awaiting_review(actor, &unlocks, &authored))
    }

    /// Reviews written by the caller in any status, newest first.
    pub fn my_reviews(&self, actor: &AccountId) -> Result<Vec<Review>, MarketplaceError> {
        let mut authored =
            <S as Repository<Review>>::query(self.store.as_ref(), &|review: &Review| {
                &review.author_id == actor
            })?;
        authored.reverse();
        Ok(authored)
    }

    /// Moderation queue: pending reviews, newest first.
    pub fn pending_reviews(&self, admin: &AccountId) -> Result<Vec<Review>, MarketplaceError> {
        self.require_admin(admin)?;
        let mut pending =
            <S as Repository<Review>>::query(self.store.as_ref(), &|review: &Review| {
                review.status == ReviewStatus::Pending
            })?;
        pending.reverse();
        Ok(pending)
    }

    pub fn public_reviews(
        &self,
        viewer: Option<&AccountId>,
        professional_id: &ProfessionalId,
    ) -> Result<Vec<PublicReview>, MarketplaceError> {
        let profile = load_active_profile(self.store.as_ref(), professional_id)?;
        let is_owner = viewer.is_some_and(|viewer| profile.is_owned_by(viewer));
        let about = self.reviews_about(professional_id)?;
        Ok(reviews::visible_reviews(&about, is_owner))
    }

    fn reviews_about(&self, professional_id: &ProfessionalId) -> Result<Vec<Review>, MarketplaceError> {
        Ok(<S as Repository<Review>>::query(
            self.store.as_ref(),
            &|review: &Review| &review.professional_id == professional_id,
        )?)
    }

    fn refresh_rating(&self, professional_id: &ProfessionalId) -> Result<(), MarketplaceError> {
        let summary = reviews::summarize(&self.reviews_about(professional_id)?);
        match self.store.record_rating(professional_id, summary) {
            Ok(_) | Err(RepositoryError::NotFound) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    pub fn select_plan(
        &self,
        actor: &AccountId,
        tier: PlanTier,
        now: DateTime<Utc>,
    ) -> Result<PlanSubscription, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        let score = completion::score(&profile);
        profile
            .plan
            .select(tier, score, self.policy.plan_completion_threshold, now)?;
        let profile = self.save_profile(profile)?;
        info!(
            professional = %profile.id.0,
            plan = tier.label(),
            ends_at = ?profile.plan.ends_at,
            "plan selected"
        );
        Ok(profile.plan)
    }

    pub fn cancel_plan(&self, actor: &AccountId) -> Result<PlanSubscription, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        profile.plan.cancel()?;
        let profile = self.save_profile(profile)?;
        info!(professional = %profile.id.0, ends_at = ?profile.plan.ends_at, "plan cancelling at period end");
        Ok(profile.plan)
    }

    pub fn reactivate_plan(&self, actor: &AccountId) -> Result<PlanSubscription, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        profile.plan.reactivate()?;
        let profile = self.save_profile(profile)?;
        info!(professional = %profile.id.0, "plan reactivated");
        Ok(profile.plan)
    }

    pub fn set_featured(
        &self,
        actor: &AccountId,
        enabled: bool,
    ) -> Result<PlanSubscription, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        let change = profile.plan.set_featured(enabled)?;
        if change == FeaturedChange::Unchanged {
            return Ok(profile.plan);
        }
        let profile = self.save_profile(profile)?;
        info!(professional = %profile.id.0, ?change, "featured add-on toggled");
        Ok(profile.plan)
    }

    pub fn submit_documents(
        &self,
        actor: &AccountId,
        urls: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<VerificationRequest, MarketplaceError> {
        let mut profile = self.owned_profile(actor)?;
        profile
            .verification
            .submit_documents(urls, self.policy.max_verification_documents, now)?;
        let profile = self.save_profile(profile)?;
        info!(
            professional = %profile.id.0,
            documents = profile.verification.documents.len(),
            "verification documents submitted"
        );
        Ok(profile.verification)
    }

    pub fn decide_verification(
        &self,
        admin: &AccountId,
        professional_id: &ProfessionalId,
        verdict: VerificationVerdict,
        now: DateTime<Utc>,
    ) -> Result<VerificationRequest, MarketplaceError> {
        self.require_admin(admin)?;
        let mut profile = load_active_profile(self.store.as_ref(), professional_id)?;
        profile.verification.decide(verdict, admin, now)?;
        let profile = self.save_profile(profile)?;
        info!(
            professional = %profile.id.0,
            status = profile.verification.status.label(),
            moderator = %admin.0,
            "verification decided"
        );
        Ok(profile.verification)
    }

    /// Non-archived listings awaiting a verification decision, ordered by name.
    pub fn pending_verifications(
        &self,
        admin: &AccountId,
    ) -> Result<Vec<ProfessionalProfile>, MarketplaceError> {
        self.require_admin(admin)?;
        let mut pending = <S as Repository<ProfessionalProfile>>::query(
            self.store.as_ref(),
            &|profile: &ProfessionalProfile| {
                !profile.is_archived()
                    && profile.verification.status == VerificationStatus::Pending
            },
        )?;
        pending.sort_by(|a, b| {
            a.identity
                .name
                .to_lowercase()
                .cmp(&b.identity.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(pending)
    }

    fn require_admin(&self, actor: &AccountId) -> Result<Account, MarketplaceError> {
        let account = load_account(self.store.as_ref(), actor)?;
        if !account.is_admin {
            return Err(MarketplaceError::Forbidden("administrator role required"));
        }
        Ok(account)
    }

    fn find_owned_profile(
        &self,
        actor: &AccountId,
    ) -> Result<Option<ProfessionalProfile>, MarketplaceError> {
        let owned = <S as Repository<ProfessionalProfile>>::query(
            self.store.as_ref(),
            &|profile: &ProfessionalProfile| profile.is_owned_by(actor),
        )?;
        Ok(owned.into_iter().next())
    }

    fn owned_profile(&self, actor: &AccountId) -> Result<ProfessionalProfile, MarketplaceError> {
        self.find_owned_profile(actor)?
            .ok_or_else(|| MarketplaceError::NotFound {
                entity: "professional profile for account",
                id: actor.0.clone(),
            })
    }

    fn save_account(&self, account: Account) -> Result<Account, MarketplaceError> {
        Ok(<S as Repository<Account>>::upsert(self.store.as_ref(), account)?)
    }

    fn save_profile(
        &self,
        profile: ProfessionalProfile,
    ) -> Result<ProfessionalProfile, MarketplaceError> {
        Ok(<S as Repository<ProfessionalProfile>>::upsert(
            self.store.as_ref(),
            profile,
        )?)
    }
}

/// How a failure should be surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request can be corrected by the user.
    Validation,
    /// The client acted on outdated state and should refresh.
    StaleState,
    NotFound,
    Forbidden,
    /// Nothing was applied; the failure is reported upward.
    Infrastructure,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::StaleState => "stale_state",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }
}

/// Error raised by the marketplace service.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl MarketplaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketplaceError::Ledger(_) => ErrorKind::Validation,
            MarketplaceError::Plan(PlanError::NoActivePlan | PlanError::NotCancelling { .. }) => {
                ErrorKind::StaleState
            }
            MarketplaceError::Plan(_) => ErrorKind::Validation,
            MarketplaceError::Verification(VerificationError::NotPending { .. }) => {
                ErrorKind::StaleState
            }
            MarketplaceError::Verification(_) => ErrorKind::Validation,
            MarketplaceError::Review(ReviewError::NotPending { .. }) => ErrorKind::StaleState,
            MarketplaceError::Review(_) => ErrorKind::Validation,
            MarketplaceError::Repository(RepositoryError::Conflict) => ErrorKind::StaleState,
            MarketplaceError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            MarketplaceError::Repository(RepositoryError::Unavailable(_)) => {
                ErrorKind::Infrastructure
            }
            MarketplaceError::NotFound { .. } => ErrorKind::NotFound,
            MarketplaceError::Forbidden(_) => ErrorKind::Forbidden,
            MarketplaceError::InvalidRequest(_) => ErrorKind::Validation,
        }
    }

    /// Short hint telling the user what to do next.
    pub fn action(&self) -> String {
        match self {
            MarketplaceError::Ledger(LedgerError::InsufficientCredits { .. }) => {
                "buy more credits".to_string()
            }
            MarketplaceError::Ledger(LedgerError::InvalidAmount { .. }) => {
                "choose a positive number of credits".to_string()
            }
            MarketplaceError::Plan(PlanError::ProfileIncomplete { required, .. }) => {
                format!("complete your profile to {required}%")
            }
            MarketplaceError::Plan(PlanError::NoActivePlan) => {
                "choose a plan first".to_string()
            }
            MarketplaceError::Plan(PlanError::PlanForbids { .. }) => {
                "upgrade to the monthly or annual plan to be featured".to_string()
            }
            MarketplaceError::Plan(PlanError::IncludedNotRemovable) => {
                "featured placement is part of your annual plan".to_string()
            }
            MarketplaceError::Review(ReviewError::NotUnlocked) => {
                "unlock this professional before reviewing".to_string()
            }
            MarketplaceError::Review(ReviewError::InvalidRating { .. }) => {
                "pick between 1 and 5 stars".to_string()
            }
            MarketplaceError::Review(ReviewError::TestimonyTooShort { min, .. }) => {
                format!("write at least {min} characters")
            }
            MarketplaceError::Verification(VerificationError::TooManyDocuments { max, .. }) => {
                format!("upload at most {max} documents")
            }
            MarketplaceError::Verification(
                VerificationError::NoDocuments | VerificationError::BlankDocument,
            ) => "upload at least one document".to_string(),
            _ => match self.kind() {
                ErrorKind::Validation => "check the request and try again".to_string(),
                ErrorKind::StaleState => "refresh and try again".to_string(),
                ErrorKind::NotFound => "check the identifier".to_string(),
                ErrorKind::Forbidden => "sign in with an account allowed to do this".to_string(),
                ErrorKind::Infrastructure => "try again later".to_string(),
            },
        }
    }
}
