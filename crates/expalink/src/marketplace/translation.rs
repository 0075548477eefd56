//! Generated profile translations.
//!
//! The text generator is an external dependency that returns raw JSON. Any failure, from
//! transport errors to malformed output, degrades to the untranslated source text so that
//! saving a profile never fails because of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::LocalizedContent;

pub const SUPPORTED_LANGUAGES: [&str; 7] = ["en", "fr", "es", "it", "nl", "ru", "uk"];

/// Translations of a single specialty keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecialtyTranslation {
    pub original: String,
    #[serde(flatten)]
    pub translations: BTreeMap<String, String>,
}

/// Port for the generative text service.
pub trait TextGenerator: Send + Sync {
    /// Returns the raw JSON document produced by the model.
    fn translate_profile(
        &self,
        bio: &str,
        specialties: &[String],
        languages: &[&str],
    ) -> Result<String, TranslationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("text generator unavailable: {0}")]
    Unavailable(String),
    #[error("text generator returned malformed output: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GeneratedPayload {
    #[serde(default)]
    bios: BTreeMap<String, String>,
    #[serde(default, rename = "specialtyTranslations")]
    specialty_translations: Vec<SpecialtyTranslation>,
}

pub fn parse_response(raw: &str) -> Result<LocalizedContent, TranslationError> {
    let payload: GeneratedPayload = serde_json::from_str(raw.trim())?;
    Ok(LocalizedContent {
        bios: payload.bios,
        specialties: payload.specialty_translations,
    })
}

/// The source bio under every supported language, no specialty translations.
pub fn passthrough(bio: &str) -> LocalizedContent {
    LocalizedContent {
        bios: SUPPORTED_LANGUAGES
            .iter()
            .map(|code| (code.to_string(), bio.to_string()))
            .collect(),
        specialties: Vec::new(),
    }
}

pub fn translate_or_passthrough<G>(
    generator: &G,
    bio: &str,
    specialties: &[String],
) -> LocalizedContent
where
    G: TextGenerator + ?Sized,
{
    let generated = generator
        .translate_profile(bio, specialties, &SUPPORTED_LANGUAGES)
        .and_then(|raw| parse_response(&raw));

    match generated {
        Ok(content) => content,
        Err(error) => {
            warn!(%error, "profile translation failed; storing source text");
            passthrough(bio)
        }
    }
}
