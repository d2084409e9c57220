//! Animation catalog: which clip files exist per gender and role, and where
//! they are fetched from.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationRole {
    Idle,
    Dance,
}

impl AnimationRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationRole::Idle => "idle",
            AnimationRole::Dance => "dance",
        }
    }
}

impl fmt::Display for AnimationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clip files of one gender. Clips are registered under these file names,
/// so they must be unique across genders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderClips {
    pub idle: String,
    pub dances: Vec<String>,
}

impl GenderClips {
    /// Clip bound to a number key: `"1"` is idle, `"2"`..`"9"` the dances in order.
    #[must_use]
    pub fn clip_for_key(&self, key: &str) -> Option<&str> {
        let digit = key.parse::<usize>().ok()?;
        match digit {
            1 => Some(self.idle.as_str()),
            2..=9 => self.dances.get(digit - 2).map(String::as_str),
            _ => None,
        }
    }

    /// Every file in the catalog, idle first.
    pub fn files(&self) -> impl Iterator<Item = (AnimationRole, &str)> {
        std::iter::once((AnimationRole::Idle, self.idle.as_str()))
            .chain(self.dances.iter().map(|d| (AnimationRole::Dance, d.as_str())))
    }
}

/// `{base_url}/{gender}/{role}/{file}`.
#[must_use]
pub fn clip_url(base_url: &str, gender: Gender, role: AnimationRole, file: &str) -> String {
    format!("{}/{}/{}/{}", base_url.trim_end_matches('/'), gender, role, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clips() -> GenderClips {
        GenderClips {
            idle: "female_idle.glb".to_string(),
            dances: vec!["female_dance_1.glb".to_string(), "female_dance_2.glb".to_string()],
        }
    }

    #[test]
    fn url_layout() {
        assert_eq!(
            clip_url("https://localhost/assets/animations/", Gender::Female, AnimationRole::Dance, "a.glb"),
            "https://localhost/assets/animations/female/dance/a.glb"
        );
        assert_eq!(
            clip_url("/srv/anim", Gender::Male, AnimationRole::Idle, "idle.glb"),
            "/srv/anim/male/idle/idle.glb"
        );
    }

    #[test]
    fn number_keys_map_to_catalog_order() {
        let c = clips();
        assert_eq!(c.clip_for_key("1"), Some("female_idle.glb"));
        assert_eq!(c.clip_for_key("2"), Some("female_dance_1.glb"));
        assert_eq!(c.clip_for_key("3"), Some("female_dance_2.glb"));
        assert_eq!(c.clip_for_key("4"), None);
        assert_eq!(c.clip_for_key("0"), None);
        assert_eq!(c.clip_for_key("x"), None);
    }

    #[test]
    fn files_list_idle_first() {
        let c = clips();
        let files: Vec<_> = c.files().collect();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], (AnimationRole::Idle, "female_idle.glb"));
        assert_eq!(files[2], (AnimationRole::Dance, "female_dance_2.glb"));
    }

    #[test]
    fn gender_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(serde_json::from_str::<Gender>("\"male\"").unwrap(), Gender::Male);
    }
}
