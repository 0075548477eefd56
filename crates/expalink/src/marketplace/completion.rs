use serde::{Deserialize, Serialize};

use super::domain::ProfessionalProfile;

/// Minimum bio length, in characters, that earns the bio weight.
pub const MIN_BIO_CHARS: usize = 20;

/// Score a profile needs before any plan can be purchased.
pub const PLAN_COMPLETION_THRESHOLD: u8 = 85;

/// Weighted check contributing to the profile completion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCheck {
    Name,
    Photo,
    Nationality,
    Phone,
    Profession,
    YearsOfExperience,
    Bio,
    City,
    Language,
    Specialty,
}

impl CompletionCheck {
    pub const ALL: [CompletionCheck; 10] = [
        CompletionCheck::Name,
        CompletionCheck::Photo,
        CompletionCheck::Nationality,
        CompletionCheck::Phone,
        CompletionCheck::Profession,
        CompletionCheck::YearsOfExperience,
        CompletionCheck::Bio,
        CompletionCheck::City,
        CompletionCheck::Language,
        CompletionCheck::Specialty,
    ];

    pub const fn weight(self) -> u8 {
        match self {
            CompletionCheck::Bio => 20,
            CompletionCheck::YearsOfExperience | CompletionCheck::Specialty => 5,
            _ => 10,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CompletionCheck::Name => "name",
            CompletionCheck::Photo => "photo",
            CompletionCheck::Nationality => "nationality",
            CompletionCheck::Phone => "phone",
            CompletionCheck::Profession => "profession",
            CompletionCheck::YearsOfExperience => "years of experience",
            CompletionCheck::Bio => "bio",
            CompletionCheck::City => "city",
            CompletionCheck::Language => "language",
            CompletionCheck::Specialty => "specialty",
        }
    }

    pub fn is_satisfied(self, profile: &ProfessionalProfile) -> bool {
        let identity = &profile.identity;
        let expertise = &profile.expertise;
        match self {
            CompletionCheck::Name => is_filled(&identity.name),
            CompletionCheck::Photo => identity.image_url.as_deref().is_some_and(is_filled),
            CompletionCheck::Nationality => has_entry(&identity.nationalities),
            CompletionCheck::Phone => profile.contact.phone.as_deref().is_some_and(is_filled),
            CompletionCheck::Profession => has_entry(&expertise.professions),
            CompletionCheck::YearsOfExperience => expertise.years_of_experience.is_some(),
            CompletionCheck::Bio => expertise.bio.trim().chars().count() >= MIN_BIO_CHARS,
            CompletionCheck::City => has_entry(&expertise.cities),
            CompletionCheck::Language => has_entry(&expertise.languages),
            CompletionCheck::Specialty => has_entry(&expertise.specialties),
        }
    }
}

fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn has_entry(values: &[String]) -> bool {
    values.iter().any(|value| is_filled(value))
}

/// Score plus the checks still missing, so owners know what to fill in next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub score: u8,
    pub missing: Vec<CompletionCheck>,
}

impl CompletionReport {
    pub fn meets(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}

pub fn report(profile: &ProfessionalProfile) -> CompletionReport {
    let mut score: u8 = 0;
    let mut missing = Vec::new();
    for check in CompletionCheck::ALL {
        if check.is_satisfied(profile) {
            score = score.saturating_add(check.weight());
        } else {
            missing.push(check);
        }
    }

    CompletionReport {
        score: score.min(100),
        missing,
    }
}

/// Completion score in `0..=100`.
pub fn score(profile: &ProfessionalProfile) -> u8 {
    report(profile).score
}
