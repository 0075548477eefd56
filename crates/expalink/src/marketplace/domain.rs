use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::PlanSubscription;
use super::translation::SpecialtyTranslation;
use super::verification::VerificationRequest;

/// Identifier of an identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

/// Identifier of a professional listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfessionalId(pub String);

/// Identifier of a submitted review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

/// Active side of the marketplace an account is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Expat,
    Pro,
}

/// Identity record; credits are the spendable unlock currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub role: Role,
    #[serde(default)]
    pub is_admin: bool,
    pub credits: u64,
    #[serde(default)]
    pub preferred_city: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deletion_requested_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(id: impl Into<String>, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id: AccountId(id.into()),
            role,
            is_admin: false,
            credits: 0,
            preferred_city: None,
            created_at,
            deletion_requested_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.deletion_requested_at.is_some()
    }
}

/// WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Zero and non-finite components are placeholders for "unknown".
    pub fn is_known(&self) -> bool {
        [self.latitude, self.longitude]
            .iter()
            .all(|value| value.is_finite() && *value != 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    PreferNotToSay,
}

/// Personally identifying fields, gated behind an unlock.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfessionalIdentity {
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub nationalities: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Direct-contact fields, gated behind an unlock.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Comparison-shopping fields, visible to everyone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expertise {
    #[serde(default)]
    pub professions: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub years_of_experience: Option<u8>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

/// Counters and moderated aggregates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileStats {
    pub views: u64,
    pub unlocks: u64,
    pub rating: Option<f32>,
    pub review_count: u32,
}

/// Generated translations attached to a listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalizedContent {
    #[serde(default)]
    pub bios: BTreeMap<String, String>,
    #[serde(default)]
    pub specialties: Vec<SpecialtyTranslation>,
}

/// Public/private split listing owned by a pro account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub id: ProfessionalId,
    pub owner_id: AccountId,
    pub identity: ProfessionalIdentity,
    #[serde(default)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub expertise: Expertise,
    #[serde(default)]
    pub localized: LocalizedContent,
    #[serde(default)]
    pub plan: PlanSubscription,
    #[serde(default)]
    pub verification: VerificationRequest,
    #[serde(default)]
    pub stats: ProfileStats,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl ProfessionalProfile {
    /// Empty listing for a freshly onboarded pro. The listing id mirrors the owner id.
    pub fn new(owner_id: AccountId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ProfessionalId(owner_id.0.clone()),
            owner_id,
            identity: ProfessionalIdentity {
                name: name.into(),
                ..ProfessionalIdentity::default()
            },
            contact: ContactDetails::default(),
            expertise: Expertise::default(),
            localized: LocalizedContent::default(),
            plan: PlanSubscription::default(),
            verification: VerificationRequest::default(),
            stats: ProfileStats::default(),
            is_online: true,
            created_at,
            archived_at: None,
        }
    }

    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        &self.owner_id == account
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn is_listed(&self) -> bool {
        self.is_online && !self.is_archived()
    }

    /// Bio in the requested language, else English, else the source text.
    pub fn localized_bio(&self, language: &str) -> &str {
        let code = language.split('-').next().unwrap_or(language);
        self.localized
            .bios
            .get(code)
            .or_else(|| self.localized.bios.get("en"))
            .map(String::as_str)
            .filter(|bio| !bio.trim().is_empty())
            .unwrap_or(&self.expertise.bio)
    }

    /// Service label used when a review does not name one.
    pub fn primary_profession(&self) -> &str {
        self.expertise
            .professions
            .first()
            .map(String::as_str)
            .unwrap_or("Expert")
    }
}

/// Permanent grant letting one account see one listing's private fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub account_id: AccountId,
    pub professional_id: ProfessionalId,
    pub unlocked_at: DateTime<Utc>,
    pub has_reviewed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Verified,
    Rejected,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Verified => "verified",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

/// Testimony left by an account holding an unlock for the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub author_id: AccountId,
    pub professional_id: ProfessionalId,
    pub stars: u8,
    pub testimony: String,
    pub service_type: String,
    pub anonymous: bool,
    pub status: ReviewStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub moderated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> ProfessionalProfile {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        ProfessionalProfile::new(AccountId("pro-1".to_string()), "Lucia Garcia", created)
    }

    #[test]
    fn localized_bio_falls_back_to_english_then_source() {
        let mut profile = profile();
        profile.expertise.bio = "Fuente original".to_string();
        assert_eq!(profile.localized_bio("fr"), "Fuente original");

        profile
            .localized
            .bios
            .insert("en".to_string(), "English bio".to_string());
        assert_eq!(profile.localized_bio("fr-FR"), "English bio");

        profile
            .localized
            .bios
            .insert("fr".to_string(), "Bio française".to_string());
        assert_eq!(profile.localized_bio("fr-FR"), "Bio française");
    }

    #[test]
    fn archived_or_offline_profiles_are_not_listed() {
        let mut profile = profile();
        assert!(profile.is_listed());

        profile.is_online = false;
        assert!(!profile.is_listed());

        profile.is_online = true;
        profile.archived_at = Some(profile.created_at);
        assert!(!profile.is_listed());
    }

    #[test]
    fn zero_coordinates_are_unknown() {
        assert!(!Coordinates::new(0.0, -3.7).is_known());
        assert!(!Coordinates::new(f64::NAN, -3.7).is_known());
        assert!(Coordinates::new(40.4, -3.7).is_known());
    }
}
