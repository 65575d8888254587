//! Care contacts notified about verification results.

use serde::{Deserialize, Serialize};

/// Role of a contact within a patient's care team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Doctor,
    Family,
}

impl ContactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRole::Doctor => "doctor",
            ContactRole::Family => "family",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "doctor" => Some(ContactRole::Doctor),
            "family" => Some(ContactRole::Family),
            _ => None,
        }
    }
}

/// A person reachable by email and/or phone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    /// Whether any delivery address is present.
    pub fn is_reachable(&self) -> bool {
        has_value(&self.email) || has_value(&self.phone)
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|p| !p.trim().is_empty())
    }
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Doctor and family contacts for one patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CareTeam {
    pub doctor: Option<Contact>,
    pub family: Vec<Contact>,
}

impl CareTeam {
    pub fn is_empty(&self) -> bool {
        self.doctor.is_none() && self.family.is_empty()
    }

    /// Fallback team from `DEFAULT_DOCTOR_*` / `DEFAULT_FAMILY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Fallback team from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let doctor = Contact {
            name: "Doctor".into(),
            email: lookup("DEFAULT_DOCTOR_EMAIL"),
            phone: lookup("DEFAULT_DOCTOR_PHONE"),
        };
        let family = Contact {
            name: "Family Member".into(),
            email: lookup("DEFAULT_FAMILY_EMAIL"),
            phone: lookup("DEFAULT_FAMILY_PHONE"),
        };

        Self {
            doctor: Some(doctor).filter(Contact::is_reachable),
            family: Some(family).filter(Contact::is_reachable).into_iter().collect(),
        }
    }
}
