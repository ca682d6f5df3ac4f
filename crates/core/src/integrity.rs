//! Referential and department invariants of a single fragment.
//!
//! The same rules are checked against seed definitions before they are
//! loaded and against the rows read back from a provisioned fragment.

use std::collections::HashSet;
use std::fmt;

use crate::fragment::Department;

/// Borrowed, key-only view of a fragment's four tables.
#[derive(Debug, Default)]
pub struct FragmentSnapshot<'a> {
    /// `(group code, department)`
    pub groups: Vec<(&'a str, &'a str)>,
    /// `(employee code, group code)`
    pub employees: Vec<(&'a str, &'a str)>,
    /// `(project code, group code)`
    pub projects: Vec<(&'a str, &'a str)>,
    /// `(employee code, project code)`
    pub participations: Vec<(&'a str, &'a str)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateKey { table: &'static str, key: String },
    WrongDepartment { group: String, found: String, expected: String },
    EmployeeWithoutGroup { employee: String, group: String },
    ProjectWithoutGroup { project: String, group: String },
    ParticipationWithoutEmployee { employee: String, project: String },
    ParticipationWithoutProject { employee: String, project: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateKey { table, key } => write!(f, "duplicate {table} key {key}"),
            Violation::WrongDepartment { group, found, expected } => write!(
                f,
                "group {group} belongs to department {found}, expected {expected}"
            ),
            Violation::EmployeeWithoutGroup { employee, group } => {
                write!(f, "employee {employee} references missing group {group}")
            }
            Violation::ProjectWithoutGroup { project, group } => {
                write!(f, "project {project} references missing group {group}")
            }
            Violation::ParticipationWithoutEmployee { employee, project } => write!(
                f,
                "participation {employee}/{project} references missing employee"
            ),
            Violation::ParticipationWithoutProject { employee, project } => write!(
                f,
                "participation {employee}/{project} references missing project"
            ),
        }
    }
}

impl<'a> FragmentSnapshot<'a> {
    /// Every invariant violation, in table order. Empty means consistent.
    pub fn violations(&self, department: &Department) -> Vec<Violation> {
        let mut out = Vec::new();

        let groups = unique_keys("group", self.groups.iter().map(|(k, _)| *k), &mut out);
        let employees = unique_keys("employee", self.employees.iter().map(|(k, _)| *k), &mut out);
        let projects = unique_keys("project", self.projects.iter().map(|(k, _)| *k), &mut out);
        unique_keys(
            "participation",
            self.participations.iter().map(|(e, p)| PairKey(*e, *p)),
            &mut out,
        );

        for (group, found) in &self.groups {
            if *found != department.as_str() {
                out.push(Violation::WrongDepartment {
                    group: group.to_string(),
                    found: found.to_string(),
                    expected: department.to_string(),
                });
            }
        }

        for (employee, group) in &self.employees {
            if !groups.contains(group) {
                out.push(Violation::EmployeeWithoutGroup {
                    employee: employee.to_string(),
                    group: group.to_string(),
                });
            }
        }

        for (project, group) in &self.projects {
            if !groups.contains(group) {
                out.push(Violation::ProjectWithoutGroup {
                    project: project.to_string(),
                    group: group.to_string(),
                });
            }
        }

        for (employee, project) in &self.participations {
            if !employees.contains(employee) {
                out.push(Violation::ParticipationWithoutEmployee {
                    employee: employee.to_string(),
                    project: project.to_string(),
                });
            }
            if !projects.contains(project) {
                out.push(Violation::ParticipationWithoutProject {
                    employee: employee.to_string(),
                    project: project.to_string(),
                });
            }
        }

        out
    }
}

/// Composite participation key, displayed as `employee/project`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey<'a>(&'a str, &'a str);

impl fmt::Display for PairKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

fn unique_keys<K, I>(table: &'static str, keys: I, out: &mut Vec<Violation>) -> HashSet<K>
where
    K: std::hash::Hash + Eq + fmt::Display + Copy,
    I: Iterator<Item = K>,
{
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            out.push(Violation::DuplicateKey {
                table,
                key: key.to_string(),
            });
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p1() -> Department {
        Department::parse("P1").unwrap()
    }

    fn consistent<'a>() -> FragmentSnapshot<'a> {
        FragmentSnapshot {
            groups: vec![("NC01", "P1"), ("NC02", "P1")],
            employees: vec![("NV01", "NC01"), ("NV03", "NC02")],
            projects: vec![("DA01", "NC01")],
            participations: vec![("NV01", "DA01"), ("NV03", "DA01")],
        }
    }

    #[test]
    fn consistent_snapshot_has_no_violations() {
        assert!(consistent().violations(&p1()).is_empty());
    }

    #[test]
    fn empty_snapshot_has_no_violations() {
        assert!(FragmentSnapshot::default().violations(&p1()).is_empty());
    }

    #[test]
    fn detects_wrong_department() {
        let mut snapshot = consistent();
        snapshot.groups[1] = ("NC02", "P2");

        assert_eq!(
            snapshot.violations(&p1()),
            vec![Violation::WrongDepartment {
                group: "NC02".into(),
                found: "P2".into(),
                expected: "P1".into(),
            }]
        );
    }

    #[test]
    fn detects_dangling_group_references() {
        let mut snapshot = consistent();
        snapshot.employees.push(("NV09", "NC99"));
        snapshot.projects.push(("DA09", "NC98"));

        let violations = snapshot.violations(&p1());
        assert!(violations.contains(&Violation::EmployeeWithoutGroup {
            employee: "NV09".into(),
            group: "NC99".into(),
        }));
        assert!(violations.contains(&Violation::ProjectWithoutGroup {
            project: "DA09".into(),
            group: "NC98".into(),
        }));
    }

    #[test]
    fn detects_dangling_participation() {
        let mut snapshot = consistent();
        snapshot.participations.push(("NV77", "DA77"));

        let violations = snapshot.violations(&p1());
        assert_eq!(violations.len(), 2);
        assert!(matches!(
            violations[0],
            Violation::ParticipationWithoutEmployee { .. }
        ));
        assert!(matches!(
            violations[1],
            Violation::ParticipationWithoutProject { .. }
        ));
    }

    #[test]
    fn detects_duplicate_keys() {
        let mut snapshot = consistent();
        snapshot.groups.push(("NC01", "P1"));
        snapshot.participations.push(("NV01", "DA01"));

        let violations = snapshot.violations(&p1());
        let duplicates: Vec<_> = violations
            .iter()
            .filter(|v| matches!(v, Violation::DuplicateKey { .. }))
            .collect();
        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[1].to_string(), "duplicate participation key NV01/DA01");
    }

    #[test]
    fn violation_messages_name_the_rows() {
        let v = Violation::ProjectWithoutGroup {
            project: "DA09".into(),
            group: "NC98".into(),
        };
        assert_eq!(v.to_string(), "project DA09 references missing group NC98");
    }
}
