//! Department and section entities

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Department {
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A department as the caller wants it to be: name plus section names in
/// insertion order. Used for both create and replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DepartmentDraft {
    #[validate(length(min = 1, max = 200, message = "Department name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_section_names"))]
    #[serde(default)]
    pub sections: Vec<String>,
}

fn validate_section_names(sections: &[String]) -> Result<(), ValidationError> {
    if sections.iter().any(|s| s.is_empty() || s.chars().count() > 200) {
        return Err(ValidationError::new("section_name")
            .with_message("Section names must be between 1 and 200 characters".into()));
    }
    Ok(())
}

impl DepartmentDraft {
    pub fn new(name: impl Into<String>, sections: Vec<String>) -> Self {
        Self { name: name.into(), sections }
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            sections: self.sections.into_iter().map(|s| s.trim().to_string()).collect(),
        }
    }
}
