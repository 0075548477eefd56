use chrono::{DateTime, Utc};
use expalink::marketplace::{
    Account, AccountId, Coordinates, MarketplaceError, MarketplaceService, MarketplaceStore,
    PlanTier, ProfessionalId, ProfessionalProfile, Role, TextGenerator, TranslationError,
    VerificationVerdict,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Text generator used when no model endpoint is configured. Every request falls back to
/// the untranslated bio.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineTranslator;

impl TextGenerator for OfflineTranslator {
    fn translate_profile(
        &self,
        _bio: &str,
        _specialties: &[String],
        _languages: &[&str],
    ) -> Result<String, TranslationError> {
        Err(TranslationError::Unavailable(
            "no text generation endpoint configured".to_string(),
        ))
    }
}

pub(crate) const DEMO_EXPAT: &str = "expat-demo";
pub(crate) const DEMO_ADMIN: &str = "admin-demo";

struct SeedListing {
    owner: &'static str,
    name: &'static str,
    profession: &'static str,
    specialty: &'static str,
    city: &'static str,
    coordinates: Option<(f64, f64)>,
    languages: &'static [&'static str],
    bio: &'static str,
    plan: Option<PlanTier>,
    verified: bool,
}

const SEED_LISTINGS: &[SeedListing] = &[
    SeedListing {
        owner: "pro-lucia",
        name: "Lucía Gómez",
        profession: "Lawyer",
        specialty: "Residency permits",
        city: "Madrid",
        coordinates: Some((40.4190, -3.6960)),
        languages: &["English", "Spanish"],
        bio: "Immigration lawyer helping newcomers with NIE, residency and family reunification.",
        plan: Some(PlanTier::Annual),
        verified: true,
    },
    SeedListing {
        owner: "pro-jordi",
        name: "Jordi Puig",
        profession: "Gestor",
        specialty: "Autónomo registration",
        city: "Barcelona",
        coordinates: None,
        languages: &["English", "Catalan", "Spanish"],
        bio: "Gestoría for freelancers: social security, quarterly VAT and annual tax returns.",
        plan: Some(PlanTier::Founding),
        verified: false,
    },
    SeedListing {
        owner: "pro-ana",
        name: "Ana Ferrer",
        profession: "Real estate agent",
        specialty: "Long-term rentals",
        city: "Valencia",
        coordinates: Some((39.4699, -0.3763)),
        languages: &["English", "French", "Spanish"],
        bio: "Finds long-term rentals near the beach and negotiates deposits for new arrivals.",
        plan: None,
        verified: false,
    },
];

fn seed_profile(seed: &SeedListing, now: DateTime<Utc>) -> ProfessionalProfile {
    let mut profile = ProfessionalProfile::new(AccountId(seed.owner.to_string()), seed.name, now);
    profile.identity.nationalities = vec!["Spanish".to_string()];
    profile.identity.image_url = Some(format!("https://cdn.expalink.example/{}.jpg", seed.owner));
    profile.contact.phone = Some("+34 600 000 000".to_string());
    profile.contact.email = Some(format!("{}@expalink.example", seed.owner));
    profile.contact.coordinates = seed
        .coordinates
        .map(|(latitude, longitude)| Coordinates::new(latitude, longitude));
    profile.expertise.professions = vec![seed.profession.to_string()];
    profile.expertise.specialties = vec![seed.specialty.to_string()];
    profile.expertise.years_of_experience = Some(8);
    profile.expertise.bio = seed.bio.to_string();
    profile.expertise.languages = seed.languages.iter().map(|l| l.to_string()).collect();
    profile.expertise.cities = vec![seed.city.to_string()];
    profile
}

/// Register a demo expat, an admin and a handful of published listings. Returns the number
/// of listings created.
pub(crate) fn seed_marketplace<S, T>(
    service: &MarketplaceService<S, T>,
) -> Result<usize, MarketplaceError>
where
    S: MarketplaceStore + 'static,
    T: TextGenerator + 'static,
{
    let now = Utc::now();
    let mut expat = Account::new(DEMO_EXPAT, Role::Expat, now);
    expat.credits = 3;
    expat.preferred_city = Some("Madrid".to_string());
    service.register_account(expat)?;

    let mut admin = Account::new(DEMO_ADMIN, Role::Expat, now);
    admin.is_admin = true;
    service.register_account(admin)?;
    let admin = AccountId(DEMO_ADMIN.to_string());

    for seed in SEED_LISTINGS {
        let owner = AccountId(seed.owner.to_string());
        service.register_account(Account::new(seed.owner, Role::Pro, now))?;
        service.save_own_profile(&owner, seed_profile(seed, now))?;
        if let Some(tier) = seed.plan {
            service.select_plan(&owner, tier, now)?;
        }
        if seed.verified {
            service.submit_documents(
                &owner,
                vec![format!("https://docs.expalink.example/{}/id.pdf", seed.owner)],
                now,
            )?;
            service.decide_verification(
                &admin,
                &ProfessionalId(owner.0.clone()),
                VerificationVerdict::Verified,
                now,
            )?;
        }
    }
    Ok(SEED_LISTINGS.len())
}
