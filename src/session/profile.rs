use serde::{Deserialize, Serialize};

/// Grammatical gender of the user, driving the salutation the interpreter
/// persona uses. Two-valued by contract; there is no default/other arm
/// anywhere a `Gender` is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Masculino,
    Feminino,
}

impl Gender {
    pub fn salutation(&self) -> &'static str {
        match self {
            Gender::Masculino => "Prezado",
            Gender::Feminino => "Prezada",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Masculino => write!(f, "masculino"),
            Gender::Feminino => write!(f, "feminino"),
        }
    }
}

/// Who the session is for. Created at onboarding, immutable for the rest of
/// the session; a new session resets it to the empty default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub gender: Gender,
}

impl UserProfile {
    /// Onboarding guard: at least two characters after trimming.
    pub fn is_valid(&self) -> bool {
        self.name.trim().chars().count() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salutation_mapping_is_total() {
        assert_eq!(Gender::Masculino.salutation(), "Prezado");
        assert_eq!(Gender::Feminino.salutation(), "Prezada");
    }

    #[test]
    fn default_profile_is_empty_masculine() {
        let profile = UserProfile::default();
        assert_eq!(profile.name, "");
        assert_eq!(profile.gender, Gender::Masculino);
        assert!(!profile.is_valid());
    }

    #[test]
    fn name_guard_counts_trimmed_characters() {
        let short = UserProfile {
            name: "  A  ".to_string(),
            gender: Gender::Feminino,
        };
        assert!(!short.is_valid());

        let ok = UserProfile {
            name: "Ana".to_string(),
            gender: Gender::Feminino,
        };
        assert!(ok.is_valid());
    }

    #[test]
    fn gender_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Gender::Feminino).unwrap(),
            "\"feminino\""
        );
        assert_eq!(
            serde_json::to_string(&Gender::Masculino).unwrap(),
            "\"masculino\""
        );
    }
}
