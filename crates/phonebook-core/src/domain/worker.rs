// ============================================================================
// Phonebook Core - Worker Entity
// File: crates/phonebook-core/src/domain/worker.rs
// Description: Employee record stored inside a tenant partition
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Every attribute of a worker except its storage id.
///
/// One shape serves create, update and import; optional attributes are
/// simply `None`. The photo travels with the profile on create but is
/// managed through the dedicated photo operations afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WorkerProfile {
    #[validate(length(min = 1, max = 100, message = "Surname must be between 1 and 100 characters"))]
    pub surname: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Middle name too long"))]
    #[serde(default)]
    pub middle_name: Option<String>,

    #[validate(email(message = "Invalid email"), length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 32, message = "Phone number must be between 1 and 32 characters"))]
    pub phone_number: String,

    #[validate(length(max = 32))]
    #[serde(default)]
    pub cabinet: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub position: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub department: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub section: Option<String>,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Description too long"))]
    #[serde(default)]
    pub description: Option<String>,

    #[serde(skip)]
    pub photo: Option<Vec<u8>>,
}

/// Stored worker: id plus profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    #[serde(flatten)]
    pub profile: WorkerProfile,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WorkerProfile {
    /// Trims every text field, drops blank optionals and lowercases the email.
    pub fn normalized(self) -> Self {
        Self {
            surname: self.surname.trim().to_string(),
            name: self.name.trim().to_string(),
            middle_name: clean(self.middle_name),
            email: self.email.trim().to_lowercase(),
            phone_number: self.phone_number.trim().to_string(),
            cabinet: clean(self.cabinet),
            position: clean(self.position),
            department: clean(self.department),
            section: clean(self.section),
            birth_date: self.birth_date,
            description: clean(self.description),
            photo: self.photo.filter(|p| !p.is_empty()),
        }
    }

    /// Fields that already hold a value and that `proposed` would change.
    ///
    /// Non-admin editors may only fill in blanks, so any field listed here
    /// makes their update invalid. The photo is handled separately.
    pub fn locked_changes(&self, proposed: &WorkerProfile) -> Vec<&'static str> {
        fn filled(value: &str) -> bool {
            !value.is_empty()
        }
        fn filled_opt(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.is_empty())
        }

        let mut locked = Vec::new();
        if filled(&self.surname) && self.surname != proposed.surname {
            locked.push("surname");
        }
        if filled(&self.name) && self.name != proposed.name {
            locked.push("name");
        }
        if filled_opt(&self.middle_name) && self.middle_name != proposed.middle_name {
            locked.push("middle_name");
        }
        if filled(&self.email) && self.email != proposed.email {
            locked.push("email");
        }
        if filled(&self.phone_number) && self.phone_number != proposed.phone_number {
            locked.push("phone_number");
        }
        if filled_opt(&self.cabinet) && self.cabinet != proposed.cabinet {
            locked.push("cabinet");
        }
        if filled_opt(&self.position) && self.position != proposed.position {
            locked.push("position");
        }
        if filled_opt(&self.department) && self.department != proposed.department {
            locked.push("department");
        }
        if filled_opt(&self.section) && self.section != proposed.section {
            locked.push("section");
        }
        if self.birth_date.is_some() && self.birth_date != proposed.birth_date {
            locked.push("birth_date");
        }
        if filled_opt(&self.description) && self.description != proposed.description {
            locked.push("description");
        }
        locked
    }

    /// Field-by-field equality that ignores the photo.
    pub fn same_fields(&self, other: &WorkerProfile) -> bool {
        WorkerProfile { photo: None, ..self.clone() } == WorkerProfile { photo: None, ..other.clone() }
    }
}
