use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use expalink::marketplace::{
    Access, Account, AccountId, Coordinates, ErrorKind, InMemoryStore, MarketplaceError,
    MarketplacePolicy, MarketplaceService, ModerationDecision, PlanError, PlanTier,
    ProfessionalId, ProfessionalProfile, ReviewDraft, ReviewError, ReviewStatus, Role,
    TextGenerator, TranslationError, UnlockOutcome,
};

struct OfflineTranslator;

impl TextGenerator for OfflineTranslator {
    fn translate_profile(
        &self,
        _bio: &str,
        _specialties: &[String],
        _languages: &[&str],
    ) -> Result<String, TranslationError> {
        Err(TranslationError::Unavailable("no model configured".to_string()))
    }
}

type Service = MarketplaceService<InMemoryStore, OfflineTranslator>;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0)
        .single()
        .expect("valid start timestamp")
}

fn id(value: &str) -> AccountId {
    AccountId(value.to_string())
}

fn listing(owner: &str) -> ProfessionalProfile {
    let mut profile = ProfessionalProfile::new(id(owner), "Marta Ruiz", start());
    profile.identity.company_name = Some("Ruiz Gestoría".to_string());
    profile.identity.nationalities = vec!["Spanish".to_string()];
    profile.identity.image_url = Some("https://cdn.expalink.example/marta.jpg".to_string());
    profile.contact.phone = Some("+34 622 100 200".to_string());
    profile.contact.email = Some("marta@ruiz.example".to_string());
    profile.contact.address = Some("Carrer de Balmes 12, Barcelona".to_string());
    profile.contact.coordinates = Some(Coordinates::new(41.3890, 2.1590));
    profile.expertise.professions = vec!["Gestor".to_string()];
    profile.expertise.specialties = vec!["Tax returns".to_string()];
    profile.expertise.years_of_experience = Some(12);
    profile.expertise.bio =
        "Gestoría handling autónomo registration, tax filings and social security.".to_string();
    profile.expertise.languages = vec!["English".to_string(), "Catalan".to_string()];
    profile.expertise.cities = vec!["Barcelona".to_string()];
    profile
}

fn marketplace(expat_credits: u64) -> Service {
    let service = MarketplaceService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(OfflineTranslator),
        MarketplacePolicy::default(),
    );

    let mut expat = Account::new("expat-e", Role::Expat, start());
    expat.credits = expat_credits;
    service.register_account(expat).expect("register expat");
    service
        .register_account(Account::new("pro-p", Role::Pro, start()))
        .expect("register pro");
    let mut admin = Account::new("admin-a", Role::Expat, start());
    admin.is_admin = true;
    service.register_account(admin).expect("register admin");

    service
        .save_own_profile(&id("pro-p"), listing("pro-p"))
        .expect("publish listing");
    service
}

fn draft(professional: &ProfessionalId, stars: u8, testimony: &str) -> ReviewDraft {
    ReviewDraft {
        professional_id: professional.clone(),
        stars,
        testimony: testimony.to_string(),
        service_type: None,
        anonymous: false,
    }
}

#[test]
fn unlock_review_and_moderation_lifecycle() {
    let service = marketplace(2);
    let expat = id("expat-e");
    let admin = id("admin-a");
    let pro = ProfessionalId("pro-p".to_string());

    let before = service
        .view_profile(Some(&expat), &pro, None, None)
        .expect("redacted view");
    assert_eq!(before.access, Access::Redacted);
    assert_ne!(before.phone.as_deref(), Some("+34 622 100 200"));

    let receipt = service
        .confirm_unlock(&expat, &pro, start())
        .expect("first unlock");
    assert_eq!(receipt.outcome, UnlockOutcome::Unlocked);
    assert_eq!(receipt.balance, 1);
    assert_eq!(
        service.own_profile(&id("pro-p")).expect("listing").stats.unlocks,
        1
    );

    let view = service
        .view_profile(Some(&expat), &pro, None, None)
        .expect("unlocked view");
    assert_eq!(view.access, Access::Unlocked);
    assert_eq!(view.phone.as_deref(), Some("+34 622 100 200"));
    assert_eq!(view.email.as_deref(), Some("marta@ruiz.example"));

    let repeat = service
        .confirm_unlock(&expat, &pro, start() + Duration::minutes(5))
        .expect("repeat unlock");
    assert_eq!(repeat.outcome, UnlockOutcome::AlreadyUnlocked);
    assert_eq!(service.balance(&expat).expect("balance"), 1);

    // 25 characters
    let first = service
        .submit_review(&expat, draft(&pro, 4, "Sorted my NIE in a week!!"), start())
        .expect("first review");
    assert_eq!(first.status, ReviewStatus::Pending);
    let listing = service.own_profile(&id("pro-p")).expect("listing");
    assert_eq!(listing.stats.rating, None);
    assert_eq!(listing.stats.review_count, 0);
    assert!(service
        .pros_waiting_for_review(&expat)
        .expect("awaiting")
        .is_empty());

    let rejected = service
        .moderate_review(&admin, &first.id, ModerationDecision::Reject, start())
        .expect("reject");
    assert_eq!(rejected.status, ReviewStatus::Rejected);
    assert_eq!(
        service.pros_waiting_for_review(&expat).expect("awaiting"),
        vec![pro.clone()]
    );

    // 30 characters
    let second = service
        .submit_review(
            &expat,
            draft(&pro, 5, "Quick, friendly, fair pricing."),
            start() + Duration::days(1),
        )
        .expect("second review");
    assert_ne!(second.id, first.id);
    assert_eq!(second.status, ReviewStatus::Pending);

    let verified = service
        .moderate_review(
            &admin,
            &second.id,
            ModerationDecision::Verify,
            start() + Duration::days(2),
        )
        .expect("verify");
    assert_eq!(verified.status, ReviewStatus::Verified);

    let listing = service.own_profile(&id("pro-p")).expect("listing");
    assert_eq!(listing.stats.rating, Some(5.0));
    assert_eq!(listing.stats.review_count, 1);

    let public = service.public_reviews(None, &pro).expect("public reviews");
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].stars, 5);
}

#[test]
fn insufficient_credits_leave_state_untouched() {
    let service = marketplace(0);
    let expat = id("expat-e");
    let pro = ProfessionalId("pro-p".to_string());

    let error = service
        .confirm_unlock(&expat, &pro, start())
        .expect_err("no credits");
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.action(), "buy more credits");
    assert_eq!(service.balance(&expat).expect("balance"), 0);
    assert!(!service
        .can_see_private_fields(Some(&expat), &pro)
        .expect("gate"));

    let error = service
        .submit_review(&expat, draft(&pro, 5, "Never met them but sure."), start())
        .expect_err("review without unlock");
    assert!(matches!(
        error,
        MarketplaceError::Review(ReviewError::NotUnlocked)
    ));
}

#[test]
fn plan_terms_follow_selected_tier() {
    let service = marketplace(0);
    let pro = id("pro-p");

    let founding = service
        .select_plan(&pro, PlanTier::Founding, start())
        .expect("founding");
    assert_eq!(
        founding.ends_at,
        Some(
            Utc.with_ymd_and_hms(2025, 9, 14, 8, 0, 0)
                .single()
                .expect("valid end")
        )
    );
    let error = service.set_featured(&pro, true).expect_err("founding forbids");
    assert!(matches!(
        error,
        MarketplaceError::Plan(PlanError::PlanForbids { .. })
    ));

    let annual = service
        .select_plan(&pro, PlanTier::Annual, start())
        .expect("annual");
    assert_eq!(
        annual.ends_at,
        Some(
            Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0)
                .single()
                .expect("valid end")
        )
    );
    assert!(annual.is_featured());

    let monthly = service
        .select_plan(&pro, PlanTier::Monthly, start())
        .expect("monthly");
    assert_eq!(
        monthly.ends_at,
        Some(
            Utc.with_ymd_and_hms(2025, 4, 14, 8, 0, 0)
                .single()
                .expect("valid end")
        )
    );
    assert!(service.set_featured(&pro, true).expect("add-on").is_featured());
}
