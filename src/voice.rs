//! Ranked voice selection over the engine's (possibly still empty) catalog.

use crate::config::AppConfig;
use serde::Serialize;

/// A synthesis voice as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceProfile {
    pub name: String,
    pub language: String,
}

impl VoiceProfile {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePreferences {
    pub preferred_names: Vec<String>,
    pub language_prefix: String,
}

impl VoicePreferences {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            preferred_names: config.preferred_voices.clone(),
            language_prefix: config.language_prefix.clone(),
        }
    }
}

/// Pick a voice: first matching preference, then expected language, then anything.
///
/// Preferences are walked in their own order, so a later catalog entry that
/// matches the first preference beats an earlier entry matching the second.
/// Call this when narration starts; catalogs can populate after startup.
pub fn select_voice(available: &[VoiceProfile], prefs: &VoicePreferences) -> Option<VoiceProfile> {
    for preferred in prefs.preferred_names.iter().filter(|name| !name.is_empty()) {
        if let Some(voice) = available.iter().find(|voice| voice.name.contains(preferred.as_str())) {
            return Some(voice.clone());
        }
    }

    let prefix = canonical_language(&prefs.language_prefix);
    if !prefix.is_empty() {
        if let Some(voice) = available
            .iter()
            .find(|voice| canonical_language(&voice.language).starts_with(&prefix))
        {
            return Some(voice.clone());
        }
    }

    available.first().cloned()
}

fn canonical_language(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(names: &[&str], prefix: &str) -> VoicePreferences {
        VoicePreferences {
            preferred_names: names.iter().map(|name| name.to_string()).collect(),
            language_prefix: prefix.to_string(),
        }
    }

    #[test]
    fn preference_order_beats_catalog_order() {
        let catalog = vec![
            VoiceProfile::new("Google US English", "en-US"),
            VoiceProfile::new("Samantha", "en-US"),
        ];
        let picked = select_voice(&catalog, &prefs(&["Samantha", "Daniel"], "en"));
        assert_eq!(picked.map(|voice| voice.name), Some("Samantha".to_string()));
    }

    #[test]
    fn first_preference_wins_even_if_listed_later() {
        let catalog = vec![
            VoiceProfile::new("Daniel", "en-GB"),
            VoiceProfile::new("Samantha (Enhanced)", "en-US"),
        ];
        let picked = select_voice(&catalog, &prefs(&["Samantha", "Daniel"], "en"));
        assert_eq!(
            picked.map(|voice| voice.name),
            Some("Samantha (Enhanced)".to_string())
        );
    }

    #[test]
    fn falls_back_to_language_prefix() {
        let catalog = vec![VoiceProfile::new("X", "fr-FR"), VoiceProfile::new("Y", "en-GB")];
        let picked = select_voice(&catalog, &prefs(&["Samantha"], "en"));
        assert_eq!(picked.map(|voice| voice.name), Some("Y".to_string()));
    }

    #[test]
    fn language_match_ignores_case_and_separator() {
        let catalog = vec![VoiceProfile::new("X", "fr_FR"), VoiceProfile::new("Y", "EN_gb")];
        let picked = select_voice(&catalog, &prefs(&[], "en-GB"));
        assert_eq!(picked.map(|voice| voice.name), Some("Y".to_string()));
    }

    #[test]
    fn falls_back_to_first_voice_then_none() {
        let catalog = vec![VoiceProfile::new("X", "fr-FR"), VoiceProfile::new("Z", "de-DE")];
        let picked = select_voice(&catalog, &prefs(&["Samantha"], "en"));
        assert_eq!(picked.map(|voice| voice.name), Some("X".to_string()));

        assert_eq!(select_voice(&[], &prefs(&["Samantha"], "en")), None);
    }
}
