//! Floor plan lookup
//!
//! Tables, sections and staff display names are owned by the venue setup,
//! not by this server. The engine reads them through [`Directory`].
//!
//! `FloorPlan` JSON:
//!
//! ```json
//! {
//!   "locations": [
//!     {
//!       "id": 1,
//!       "sections": [
//!         { "id": 10, "name": "Terrazza", "tables": [{ "id": 100, "number": "T1" }] }
//!       ],
//!       "tables": [{ "id": 200, "number": "Bar" }]
//!     }
//!   ],
//!   "staff": [{ "id": 7, "name": "Giulia" }]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Table as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub table_id: i64,
    /// Display label ("12", "Bar")
    pub number: String,
    pub section_id: Option<i64>,
}

/// Read-only floor plan
pub trait Directory: Send + Sync + std::fmt::Debug {
    fn table(&self, location_id: i64, table_id: i64) -> Option<TableInfo>;

    fn has_section(&self, location_id: i64, section_id: i64) -> bool;

    /// Every table of a location, ordered by id
    fn tables(&self, location_id: i64) -> Vec<TableInfo>;

    fn staff_name(&self, staff_id: i64) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read floor plan: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid floor plan: {0}")]
    Parse(#[from] serde_json::Error),
}

// ========== File format ==========

#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default)]
    locations: Vec<LocationEntry>,
    #[serde(default)]
    staff: Vec<StaffEntry>,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
    id: i64,
    #[serde(default)]
    sections: Vec<SectionEntry>,
    /// Tables outside any section
    #[serde(default)]
    tables: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
struct SectionEntry {
    id: i64,
    #[serde(default)]
    tables: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    id: i64,
    number: String,
}

#[derive(Debug, Deserialize)]
struct StaffEntry {
    id: i64,
    name: String,
}

/// In-memory floor plan
#[derive(Debug, Clone, Default)]
pub struct FloorPlan {
    tables: HashMap<(i64, i64), TableInfo>,
    sections: HashMap<i64, Vec<i64>>,
    staff: HashMap<i64, String>,
}

impl FloorPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DirectoryError> {
        let file: PlanFile = serde_json::from_str(content)?;

        let mut plan = Self::new();
        for location in file.locations {
            for section in location.sections {
                plan = plan.with_section(location.id, section.id);
                for table in section.tables {
                    plan = plan.with_table(location.id, table.id, table.number, Some(section.id));
                }
            }
            for table in location.tables {
                plan = plan.with_table(location.id, table.id, table.number, None);
            }
        }
        for member in file.staff {
            plan = plan.with_staff(member.id, member.name);
        }
        Ok(plan)
    }

    pub fn with_section(mut self, location_id: i64, section_id: i64) -> Self {
        let sections = self.sections.entry(location_id).or_default();
        if !sections.contains(&section_id) {
            sections.push(section_id);
        }
        self
    }

    pub fn with_table(
        mut self,
        location_id: i64,
        table_id: i64,
        number: impl Into<String>,
        section_id: Option<i64>,
    ) -> Self {
        if let Some(section_id) = section_id {
            self = self.with_section(location_id, section_id);
        }
        self.tables.insert(
            (location_id, table_id),
            TableInfo {
                table_id,
                number: number.into(),
                section_id,
            },
        );
        self
    }

    pub fn with_staff(mut self, staff_id: i64, name: impl Into<String>) -> Self {
        self.staff.insert(staff_id, name.into());
        self
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

impl Directory for FloorPlan {
    fn table(&self, location_id: i64, table_id: i64) -> Option<TableInfo> {
        self.tables.get(&(location_id, table_id)).cloned()
    }

    fn has_section(&self, location_id: i64, section_id: i64) -> bool {
        self.sections
            .get(&location_id)
            .is_some_and(|sections| sections.contains(&section_id))
    }

    fn tables(&self, location_id: i64) -> Vec<TableInfo> {
        let mut tables: Vec<TableInfo> = self
            .tables
            .iter()
            .filter(|((location, _), _)| *location == location_id)
            .map(|(_, info)| info.clone())
            .collect();
        tables.sort_by_key(|t| t.table_id);
        tables
    }

    fn staff_name(&self, staff_id: i64) -> Option<String> {
        self.staff.get(&staff_id).cloned()
    }
}
