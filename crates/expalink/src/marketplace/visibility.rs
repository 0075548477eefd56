use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{
    AccountId, Coordinates, Gender, ProfessionalId, ProfessionalProfile, ProfileStats, Unlock,
};

pub const PHONE_PLACEHOLDER: &str = "+34 ••• ••• •••";
pub const EMAIL_PLACEHOLDER: &str = "••••••@••••.•••";
/// Characters of bio shown to viewers without access.
pub const BIO_PREVIEW_CHARS: usize = 120;

/// Set of `(account, professional)` grants consulted when rendering.
#[derive(Debug, Clone, Default)]
pub struct UnlockIndex {
    pairs: HashSet<(AccountId, ProfessionalId)>,
}

impl UnlockIndex {
    pub fn from_unlocks<'a>(unlocks: impl IntoIterator<Item = &'a Unlock>) -> Self {
        let pairs = unlocks
            .into_iter()
            .map(|unlock| (unlock.account_id.clone(), unlock.professional_id.clone()))
            .collect();
        Self { pairs }
    }

    pub fn insert(&mut self, account: AccountId, professional: ProfessionalId) {
        self.pairs.insert((account, professional));
    }

    pub fn contains(&self, account: &AccountId, professional: &ProfessionalId) -> bool {
        self.pairs
            .contains(&(account.clone(), professional.clone()))
    }
}

/// Why the viewer does or does not see private fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Owner,
    Unlocked,
    Redacted,
}

impl Access {
    pub const fn is_full(self) -> bool {
        !matches!(self, Access::Redacted)
    }
}

pub fn access_for(
    viewer: Option<&AccountId>,
    profile: &ProfessionalProfile,
    unlocks: &UnlockIndex,
) -> Access {
    match viewer {
        Some(account) if profile.is_owned_by(account) => Access::Owner,
        Some(account) if unlocks.contains(account, &profile.id) => Access::Unlocked,
        _ => Access::Redacted,
    }
}

/// Owner or unlock holder. Anonymous viewers never see private fields.
pub fn can_see_private_fields(
    viewer: Option<&AccountId>,
    profile: &ProfessionalProfile,
    unlocks: &UnlockIndex,
) -> bool {
    access_for(viewer, profile, unlocks).is_full()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AvatarView {
    Photo { url: String },
    Blurred,
    Missing,
}

/// Card/profile payload after redaction. Gated fields are `None` or placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalView {
    pub id: ProfessionalId,
    pub access: Access,
    pub display_name: String,
    pub avatar: AvatarView,
    pub company_name: Option<String>,
    pub gender: Option<Gender>,
    pub nationalities: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub professions: Vec<String>,
    pub specialties: Vec<String>,
    pub years_of_experience: Option<u8>,
    pub bio: String,
    pub languages: Vec<String>,
    pub cities: Vec<String>,
    pub rating: Option<f32>,
    pub review_count: u32,
    pub verified: bool,
    pub featured: bool,
    pub early_member: bool,
    pub is_online: bool,
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_stats: Option<ProfileStats>,
}

/// First initial followed by a period; `E.` when the name is blank.
pub fn redacted_name(name: &str) -> String {
    let initial = name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_else(|| "E".to_string());
    format!("{initial}.")
}

fn bio_preview(bio: &str) -> String {
    let trimmed = bio.trim();
    if trimmed.chars().count() <= BIO_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut preview: String = trimmed.chars().take(BIO_PREVIEW_CHARS).collect();
    preview.truncate(preview.trim_end().len());
    preview.push('…');
    preview
}

/// Render the profile for a viewer whose access was already resolved.
pub fn render(
    profile: &ProfessionalProfile,
    access: Access,
    language: Option<&str>,
    distance_km: Option<f64>,
) -> ProfessionalView {
    let bio = match language {
        Some(language) => profile.localized_bio(language),
        None => profile.expertise.bio.as_str(),
    };
    let public = ProfessionalView {
        id: profile.id.clone(),
        access,
        display_name: redacted_name(&profile.identity.name),
        avatar: if profile.identity.image_url.is_some() {
            AvatarView::Blurred
        } else {
            AvatarView::Missing
        },
        company_name: None,
        gender: None,
        nationalities: Vec::new(),
        phone: Some(PHONE_PLACEHOLDER.to_string()),
        email: Some(EMAIL_PLACEHOLDER.to_string()),
        address: None,
        coordinates: None,
        professions: profile.expertise.professions.clone(),
        specialties: profile.expertise.specialties.clone(),
        years_of_experience: profile.expertise.years_of_experience,
        bio: bio_preview(bio),
        languages: profile.expertise.languages.clone(),
        cities: profile.expertise.cities.clone(),
        rating: profile.stats.rating,
        review_count: profile.stats.review_count,
        verified: profile.verification.is_verified(),
        featured: profile.plan.is_featured(),
        early_member: profile.plan.is_early_member(),
        is_online: profile.is_online,
        distance_km,
        owner_stats: None,
    };

    if !access.is_full() {
        return public;
    }

    let identity = &profile.identity;
    let contact = &profile.contact;
    ProfessionalView {
        display_name: identity.name.clone(),
        avatar: match &identity.image_url {
            Some(url) => AvatarView::Photo { url: url.clone() },
            None => AvatarView::Missing,
        },
        company_name: identity.company_name.clone(),
        gender: Some(identity.gender),
        nationalities: identity.nationalities.clone(),
        phone: contact.phone.clone(),
        email: contact.email.clone(),
        address: contact.address.clone(),
        coordinates: contact.coordinates,
        bio: bio.to_string(),
        owner_stats: (access == Access::Owner).then(|| profile.stats.clone()),
        ..public
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile() -> ProfessionalProfile {
        let mut profile =
            ProfessionalProfile::new(AccountId("pro-7".to_string()), "lucía Fernández", Utc::now());
        profile.identity.company_name = Some("Fernández Abogados".to_string());
        profile.identity.gender = Gender::Female;
        profile.identity.nationalities = vec!["Spanish".to_string()];
        profile.identity.image_url = Some("https://cdn.example/lucia.jpg".to_string());
        profile.contact.phone = Some("+34 611 222 333".to_string());
        profile.contact.email = Some("lucia@example.es".to_string());
        profile.contact.address = Some("Calle Mayor 1, Madrid".to_string());
        profile.contact.coordinates = Some(Coordinates::new(40.41, -3.70));
        profile.expertise.professions = vec!["Lawyer".to_string()];
        profile.expertise.bio = "a".repeat(200);
        profile
    }

    fn viewer(id: &str) -> AccountId {
        AccountId(id.to_string())
    }

    #[test]
    fn anonymous_viewer_is_redacted() {
        let profile = profile();
        let index = UnlockIndex::default();
        assert!(!can_see_private_fields(None, &profile, &index));
    }

    #[test]
    fn owner_sees_private_fields_without_unlock() {
        let profile = profile();
        let index = UnlockIndex::default();
        assert_eq!(
            access_for(Some(&viewer("pro-7")), &profile, &index),
            Access::Owner
        );
    }

    #[test]
    fn unlock_grants_access_to_that_profile_only() {
        let profile = profile();
        let mut index = UnlockIndex::default();
        index.insert(viewer("expat-1"), ProfessionalId("pro-8".to_string()));
        assert!(!can_see_private_fields(
            Some(&viewer("expat-1")),
            &profile,
            &index
        ));

        index.insert(viewer("expat-1"), profile.id.clone());
        assert_eq!(
            access_for(Some(&viewer("expat-1")), &profile, &index),
            Access::Unlocked
        );
    }

    #[test]
    fn redacted_view_masks_identity_and_contact() {
        let view = render(&profile(), Access::Redacted, None, Some(3.2));
        assert_eq!(view.display_name, "L.");
        assert_eq!(view.avatar, AvatarView::Blurred);
        assert_eq!(view.phone.as_deref(), Some(PHONE_PLACEHOLDER));
        assert_eq!(view.email.as_deref(), Some(EMAIL_PLACEHOLDER));
        assert_eq!(view.company_name, None);
        assert_eq!(view.gender, None);
        assert!(view.nationalities.is_empty());
        assert_eq!(view.address, None);
        assert_eq!(view.coordinates, None);
        assert_eq!(view.bio.chars().count(), BIO_PREVIEW_CHARS + 1);
        assert!(view.bio.ends_with('…'));
        assert_eq!(view.professions, vec!["Lawyer".to_string()]);
        assert_eq!(view.distance_km, Some(3.2));
        assert!(view.owner_stats.is_none());
    }

    #[test]
    fn unlocked_view_reveals_everything_but_owner_stats() {
        let profile = profile();
        let view = render(&profile, Access::Unlocked, None, None);
        assert_eq!(view.display_name, "lucía Fernández");
        assert_eq!(view.phone.as_deref(), Some("+34 611 222 333"));
        assert_eq!(view.address.as_deref(), Some("Calle Mayor 1, Madrid"));
        assert_eq!(view.bio, profile.expertise.bio);
        assert!(matches!(view.avatar, AvatarView::Photo { .. }));
        assert!(view.owner_stats.is_none());

        let own = render(&profile, Access::Owner, None, None);
        assert_eq!(own.owner_stats, Some(profile.stats.clone()));
    }

    #[test]
    fn blank_name_redacts_to_fallback_initial() {
        assert_eq!(redacted_name("   "), "E.");
        assert_eq!(redacted_name("émile"), "É.");
    }
}
