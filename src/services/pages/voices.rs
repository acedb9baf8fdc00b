use crate::core::models::Voice;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LocaleGroup {
    pub locale: String,
    pub voices: Vec<Voice>,
}

/// Catalog grouped by locale, locales sorted, catalog order kept inside.
pub fn group_by_locale(voices: &[Voice]) -> Vec<LocaleGroup> {
    let mut groups: BTreeMap<&str, Vec<Voice>> = BTreeMap::new();
    for voice in voices {
        groups.entry(voice.locale.as_str()).or_default().push(voice.clone());
    }
    groups
        .into_iter()
        .map(|(locale, voices)| LocaleGroup {
            locale: locale.to_string(),
            voices,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(short_name: &str, locale: &str) -> Voice {
        Voice {
            short_name: short_name.to_string(),
            gender: "Female".to_string(),
            locale: locale.to_string(),
            friendly_name: None,
        }
    }

    #[test]
    fn test_groups_sorted_by_locale() {
        let groups = group_by_locale(&[
            voice("fr-FR-DeniseNeural", "fr-FR"),
            voice("en-US-JennyNeural", "en-US"),
            voice("fr-FR-EloiseNeural", "fr-FR"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].locale, "en-US");
        assert_eq!(groups[1].locale, "fr-FR");
        let names: Vec<_> = groups[1].voices.iter().map(|v| v.display_name()).collect();
        assert_eq!(names, vec!["Denise", "Eloise"]);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(group_by_locale(&[]).is_empty());
    }
}
