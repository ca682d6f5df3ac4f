//! Seed rows loaded into each fragment at provisioning time.
//!
//! The catalog is keyed by department. [`SeedCatalog::builtin`] holds the
//! illustrative rows for `P1` and `P2`; a replacement catalog can be read
//! from JSON with [`SeedCatalog::from_json`]:
//!
//! ```json
//! {
//!   "P1": {
//!     "groups": [{ "code": "NC01", "name": "Research Group Alpha", "department": "P1" }],
//!     "employees": [{ "code": "NV01", "full_name": "Nguyen Van A", "group": "NC01" }],
//!     "projects": [{ "code": "DA01", "name": "Machine Learning Platform", "group": "NC01" }],
//!     "participations": [{ "employee": "NV01", "project": "DA01" }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::fragment::Department;
use crate::integrity::FragmentSnapshot;

/// A research group (`nhomnc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeedGroup {
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub department: String,
}

/// An employee (`nhanvien`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeedEmployee {
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(min = 1, max = 10))]
    pub group: String,
}

/// A project (`dean`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeedProject {
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 10))]
    pub group: String,
}

/// An employee's participation in a project (`thamgia`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeedParticipation {
    #[validate(length(min = 1, max = 10))]
    pub employee: String,
    #[validate(length(min = 1, max = 10))]
    pub project: String,
}

/// All seed rows for one department, in insertion order per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeedSet {
    #[validate(nested)]
    #[serde(default)]
    pub groups: Vec<SeedGroup>,
    #[validate(nested)]
    #[serde(default)]
    pub employees: Vec<SeedEmployee>,
    #[validate(nested)]
    #[serde(default)]
    pub projects: Vec<SeedProject>,
    #[validate(nested)]
    #[serde(default)]
    pub participations: Vec<SeedParticipation>,
}

impl SeedSet {
    pub fn snapshot(&self) -> FragmentSnapshot<'_> {
        FragmentSnapshot {
            groups: self
                .groups
                .iter()
                .map(|g| (g.code.as_str(), g.department.as_str()))
                .collect(),
            employees: self
                .employees
                .iter()
                .map(|e| (e.code.as_str(), e.group.as_str()))
                .collect(),
            projects: self
                .projects
                .iter()
                .map(|p| (p.code.as_str(), p.group.as_str()))
                .collect(),
            participations: self
                .participations
                .iter()
                .map(|p| (p.employee.as_str(), p.project.as_str()))
                .collect(),
        }
    }

    /// Check field widths and that the set is self-contained for `department`.
    ///
    /// A set that passes can be inserted into an empty fragment without
    /// tripping any key, foreign-key or check constraint.
    pub fn validate_for(&self, department: &Department) -> Result<(), CoreError> {
        self.validate()?;

        let violations = self.snapshot().violations(department);
        if violations.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
        Err(CoreError::Validation(format!(
            "seed data for department {department}: {}",
            details.join("; ")
        )))
    }

    /// Total number of rows across all four tables.
    pub fn len(&self) -> usize {
        self.groups.len() + self.employees.len() + self.projects.len() + self.participations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Seed sets keyed by department code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedCatalog {
    sets: BTreeMap<String, SeedSet>,
}

impl SeedCatalog {
    /// The illustrative rows for departments `P1` and `P2`.
    pub fn builtin() -> Self {
        let mut sets = BTreeMap::new();

        sets.insert(
            "P1".to_string(),
            SeedSet {
                groups: vec![
                    group("NC01", "Research Group Alpha", "P1"),
                    group("NC02", "AI Research Lab", "P1"),
                ],
                employees: vec![
                    employee("NV01", "Nguyen Van A", "NC01"),
                    employee("NV02", "Tran Thi B", "NC01"),
                    employee("NV03", "Le Van C", "NC02"),
                ],
                projects: vec![
                    project("DA01", "Machine Learning Platform", "NC01"),
                    project("DA02", "Data Analytics System", "NC02"),
                ],
                participations: vec![
                    participation("NV01", "DA01"),
                    participation("NV02", "DA01"),
                    participation("NV03", "DA02"),
                ],
            },
        );

        sets.insert(
            "P2".to_string(),
            SeedSet {
                groups: vec![
                    group("NC03", "Software Engineering Group", "P2"),
                    group("NC04", "Database Research Lab", "P2"),
                ],
                employees: vec![
                    employee("NV04", "Pham Van D", "NC03"),
                    employee("NV05", "Hoang Thi E", "NC03"),
                    employee("NV06", "Vu Van F", "NC04"),
                ],
                projects: vec![
                    project("DA03", "Distributed Database System", "NC03"),
                    project("DA04", "Cloud Computing Platform", "NC04"),
                    project("DA05", "Web Application Framework", "NC03"),
                ],
                participations: vec![
                    participation("NV04", "DA03"),
                    participation("NV05", "DA03"),
                    participation("NV06", "DA04"),
                ],
            },
        );

        Self { sets }
    }

    /// Parse and validate a catalog from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let catalog: SeedCatalog = serde_json::from_str(json)?;
        for (code, set) in &catalog.sets {
            let department = Department::parse(code)?;
            set.validate_for(&department)?;
        }
        Ok(catalog)
    }

    /// The seed set for `department`.
    pub fn for_department(&self, department: &Department) -> Result<&SeedSet, CoreError> {
        self.sets
            .get(department.as_str())
            .ok_or_else(|| CoreError::UnknownDepartment(department.to_string()))
    }

    /// Department codes with seed data, in sorted order.
    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

fn group(code: &str, name: &str, department: &str) -> SeedGroup {
    SeedGroup {
        code: code.into(),
        name: name.into(),
        department: department.into(),
    }
}

fn employee(code: &str, full_name: &str, group: &str) -> SeedEmployee {
    SeedEmployee {
        code: code.into(),
        full_name: full_name.into(),
        group: group.into(),
    }
}

fn project(code: &str, name: &str, group: &str) -> SeedProject {
    SeedProject {
        code: code.into(),
        name: name.into(),
        group: group.into(),
    }
}

fn participation(employee: &str, project: &str) -> SeedParticipation {
    SeedParticipation {
        employee: employee.into(),
        project: project.into(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn dept(s: &str) -> Department {
        Department::parse(s).unwrap()
    }

    fn codes<T>(rows: &[T], key: impl Fn(&T) -> &str) -> Vec<&str> {
        rows.iter().map(key).collect()
    }

    #[test]
    fn p1_dataset_matches_literals() {
        let catalog = SeedCatalog::builtin();
        let set = catalog.for_department(&dept("P1")).unwrap();

        assert_eq!(codes(&set.groups, |g| g.code.as_str()), ["NC01", "NC02"]);
        assert_eq!(codes(&set.employees, |e| e.code.as_str()), ["NV01", "NV02", "NV03"]);
        assert_eq!(codes(&set.projects, |p| p.code.as_str()), ["DA01", "DA02"]);
        assert_eq!(set.participations.len(), 3);
        assert_eq!(set.groups[1].name, "AI Research Lab");
        assert_eq!(set.employees[2].full_name, "Le Van C");
        assert_eq!(set.employees[2].group, "NC02");
        assert_eq!(set.projects[0].name, "Machine Learning Platform");
        assert_eq!(set.participations[1], participation("NV02", "DA01"));
    }

    #[test]
    fn p2_dataset_matches_literals() {
        let catalog = SeedCatalog::builtin();
        let set = catalog.for_department(&dept("P2")).unwrap();

        assert_eq!(codes(&set.groups, |g| g.code.as_str()), ["NC03", "NC04"]);
        assert_eq!(codes(&set.employees, |e| e.code.as_str()), ["NV04", "NV05", "NV06"]);
        assert_eq!(codes(&set.projects, |p| p.code.as_str()), ["DA03", "DA04", "DA05"]);
        assert_eq!(set.participations.len(), 3);
        assert_eq!(set.projects[2], project("DA05", "Web Application Framework", "NC03"));
        assert_eq!(set.participations[2], participation("NV06", "DA04"));
        assert_eq!(set.len(), 11);
    }

    #[test]
    fn builtin_sets_are_valid_for_their_departments() {
        let catalog = SeedCatalog::builtin();
        for code in catalog.departments() {
            let department = dept(code);
            let set = catalog.for_department(&department).unwrap();
            set.validate_for(&department).unwrap();
        }
    }

    #[test]
    fn every_group_matches_its_department() {
        let catalog = SeedCatalog::builtin();
        for code in ["P1", "P2"] {
            let set = catalog.for_department(&dept(code)).unwrap();
            assert!(set.groups.iter().all(|g| g.department == code));
        }
    }

    #[test]
    fn builtin_set_is_invalid_for_other_department() {
        let catalog = SeedCatalog::builtin();
        let set = catalog.for_department(&dept("P1")).unwrap();
        assert_matches!(set.validate_for(&dept("P2")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unknown_department_is_an_error() {
        let catalog = SeedCatalog::builtin();
        assert_matches!(
            catalog.for_department(&dept("P9")),
            Err(CoreError::UnknownDepartment(d)) if d == "P9"
        );
    }

    #[test]
    fn overlong_code_fails_field_validation() {
        let mut set = SeedCatalog::builtin().for_department(&dept("P1")).unwrap().clone();
        set.employees[0].code = "NV0123456789".into();
        assert_matches!(set.validate_for(&dept("P1")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn dangling_reference_fails_validation() {
        let mut set = SeedCatalog::builtin().for_department(&dept("P2")).unwrap().clone();
        set.participations.push(participation("NV04", "DA99"));

        let err = set.validate_for(&dept("P2")).unwrap_err();
        assert!(err.to_string().contains("NV04/DA99"), "{err}");
    }

    #[test]
    fn from_json_parses_partial_sets() {
        let json = r#"{
            "X1": {
                "groups": [{ "code": "NC10", "name": "Lab", "department": "X1" }],
                "employees": [{ "code": "NV10", "full_name": "Ada", "group": "NC10" }]
            }
        }"#;
        let catalog = SeedCatalog::from_json(json).unwrap();
        let set = catalog.for_department(&dept("X1")).unwrap();

        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.employees.len(), 1);
        assert!(set.projects.is_empty());
        assert!(set.participations.is_empty());
    }

    #[test]
    fn from_json_rejects_inconsistent_sets() {
        let json = r#"{
            "X1": { "groups": [{ "code": "NC10", "name": "Lab", "department": "X2" }] }
        }"#;
        assert_matches!(SeedCatalog::from_json(json), Err(CoreError::Validation(_)));
    }

    #[test]
    fn from_json_rejects_bad_department_key() {
        let json = r#"{ "X'1": {} }"#;
        assert_matches!(
            SeedCatalog::from_json(json),
            Err(CoreError::InvalidIdentifier { kind: "department", .. })
        );
    }

    #[test]
    fn from_json_rejects_malformed_documents() {
        assert_matches!(SeedCatalog::from_json("[1, 2]"), Err(CoreError::Seed(_)));
    }
}
