//! Table Assignment Model (桌台分配)
//!
//! An assignment binds a staff member to a table, a section, or the whole
//! venue for one shift date. Ownership of a table is the most specific
//! assignment covering it: table > section > venue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::StaffRef;

/// What an assignment covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "scope",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum AssignmentScope {
    /// Whole venue
    Venue,
    Section { section_id: i64 },
    Table { table_id: i64 },
}

impl AssignmentScope {
    /// Higher wins when resolving ownership
    pub fn specificity(&self) -> u8 {
        match self {
            Self::Venue => 0,
            Self::Section { .. } => 1,
            Self::Table { .. } => 2,
        }
    }

    /// Build a scope from the optional wire fields; both set is rejected
    pub fn from_parts(section_id: Option<i64>, table_id: Option<i64>) -> Result<Self, ScopeError> {
        match (section_id, table_id) {
            (None, None) => Ok(Self::Venue),
            (Some(section_id), None) => Ok(Self::Section { section_id }),
            (None, Some(table_id)) => Ok(Self::Table { table_id }),
            (Some(_), Some(_)) => Err(ScopeError::Ambiguous),
        }
    }

    pub fn table_id(&self) -> Option<i64> {
        match self {
            Self::Table { table_id } => Some(*table_id),
            _ => None,
        }
    }

    pub fn section_id(&self) -> Option<i64> {
        match self {
            Self::Section { section_id } => Some(*section_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("sectionId and tableId are mutually exclusive")]
    Ambiguous,
}

/// How the assignment came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    /// Granted by a manager, or by a takeover
    Manual,
    SelfAssign,
}

/// Staff ↔ table/section/venue binding for one shift date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub staff_id: i64,
    pub staff_name: String,
    pub location_id: i64,
    pub shift_date: NaiveDate,
    #[serde(flatten)]
    pub scope: AssignmentScope,
    pub method: AssignmentMethod,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
}

impl Assignment {
    pub fn staff(&self) -> StaffRef {
        StaffRef::new(self.staff_id, self.staff_name.clone())
    }
}

/// Manual grant payload (`POST /api/assignments`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCreate {
    pub staff_id: i64,
    pub location_id: i64,
    /// Defaults to the current business date
    pub shift_date: Option<NaiveDate>,
    pub section_id: Option<i64>,
    pub table_id: Option<i64>,
}

/// Self-assign payload (`POST /api/assignments/self`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfAssign {
    pub location_id: i64,
    pub shift_date: Option<NaiveDate>,
    pub section_id: Option<i64>,
    pub table_id: Option<i64>,
}

/// Resolved ownership of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOwner {
    pub location_id: i64,
    pub table_id: i64,
    pub shift_date: NaiveDate,
    /// None when the table is unowned
    pub owner: Option<StaffRef>,
    pub assignment_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_from_parts() {
        assert_eq!(AssignmentScope::from_parts(None, None), Ok(AssignmentScope::Venue));
        assert_eq!(
            AssignmentScope::from_parts(Some(3), None),
            Ok(AssignmentScope::Section { section_id: 3 })
        );
        assert_eq!(
            AssignmentScope::from_parts(None, Some(9)),
            Ok(AssignmentScope::Table { table_id: 9 })
        );
        assert_eq!(
            AssignmentScope::from_parts(Some(3), Some(9)),
            Err(ScopeError::Ambiguous)
        );
    }

    #[test]
    fn specificity_order() {
        let venue = AssignmentScope::Venue.specificity();
        let section = AssignmentScope::Section { section_id: 1 }.specificity();
        let table = AssignmentScope::Table { table_id: 1 }.specificity();
        assert!(table > section && section > venue);
    }

    #[test]
    fn assignment_flattens_scope_on_the_wire() {
        let a = Assignment {
            id: 1,
            staff_id: 2,
            staff_name: "Giulia".to_string(),
            location_id: 3,
            shift_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            scope: AssignmentScope::Table { table_id: 12 },
            method: AssignmentMethod::SelfAssign,
            created_at: 0,
            created_by: None,
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["scope"], "table");
        assert_eq!(json["tableId"], 12);
        assert_eq!(json["shiftDate"], "2026-10-16");
        assert_eq!(json["method"], "self_assign");

        let back: Assignment = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }
}
