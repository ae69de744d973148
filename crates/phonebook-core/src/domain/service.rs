//! Emergency contact entity (global, tenant-independent)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyService {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
}
