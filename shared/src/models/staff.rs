//! Staff reference

use serde::{Deserialize, Serialize};

/// Staff member as shown on devices ("assigned to ...")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRef {
    pub staff_id: i64,
    pub name: String,
}

impl StaffRef {
    pub fn new(staff_id: i64, name: impl Into<String>) -> Self {
        Self {
            staff_id,
            name: name.into(),
        }
    }
}
