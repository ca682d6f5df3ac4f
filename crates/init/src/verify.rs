//! Post-seed verification of a fragment's rows.

use research_core::fragment::{Department, FragmentId};
use research_core::integrity::FragmentSnapshot;
use research_core::types::TableCounts;
use research_db::models::employee::Employee;
use research_db::models::group::Group;
use research_db::models::participation::Participation;
use research_db::models::project::Project;
use research_db::repositories::{EmployeeRepo, GroupRepo, ParticipationRepo, ProjectRepo};
use sqlx::PgConnection;

use crate::error::{ProvisionError, Stage};

/// Read all four tables of `fragment` back and check their invariants.
///
/// Returns the row count of each table.
pub async fn verify_fragment(
    conn: &mut PgConnection,
    fragment: &FragmentId,
    department: &Department,
) -> Result<TableCounts, ProvisionError> {
    let db_err = |e| ProvisionError::database(fragment, Stage::Verify, e);

    let groups = GroupRepo::list(conn, fragment).await.map_err(db_err)?;
    let employees = EmployeeRepo::list(conn, fragment).await.map_err(db_err)?;
    let projects = ProjectRepo::list(conn, fragment).await.map_err(db_err)?;
    let participations = ParticipationRepo::list(conn, fragment)
        .await
        .map_err(db_err)?;

    let counts = check_rows(
        fragment,
        department,
        &groups,
        &employees,
        &projects,
        &participations,
    )?;
    tracing::info!(%fragment, rows = counts.total(), "Fragment verified");
    Ok(counts)
}

/// Check rows already read from a fragment.
pub fn check_rows(
    fragment: &FragmentId,
    department: &Department,
    groups: &[Group],
    employees: &[Employee],
    projects: &[Project],
    participations: &[Participation],
) -> Result<TableCounts, ProvisionError> {
    let snapshot = FragmentSnapshot {
        groups: groups
            .iter()
            .map(|g| (g.code.as_str(), g.department.as_str()))
            .collect(),
        employees: employees
            .iter()
            .map(|e| (e.code.as_str(), e.group_code.as_str()))
            .collect(),
        projects: projects
            .iter()
            .map(|p| (p.code.as_str(), p.group_code.as_str()))
            .collect(),
        participations: participations
            .iter()
            .map(|p| (p.employee_code.as_str(), p.project_code.as_str()))
            .collect(),
    };

    let violations = snapshot.violations(department);
    if !violations.is_empty() {
        return Err(ProvisionError::Integrity {
            fragment: fragment.clone(),
            violations,
        });
    }

    Ok(TableCounts {
        groups: groups.len(),
        employees: employees.len(),
        projects: projects.len(),
        participations: participations.len(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use research_core::integrity::Violation;

    use super::*;

    fn group(code: &str, department: &str) -> Group {
        Group {
            code: code.into(),
            name: format!("Group {code}"),
            department: department.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn employee(code: &str, group: &str) -> Employee {
        Employee {
            code: code.into(),
            full_name: format!("Employee {code}"),
            group_code: group.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn project(code: &str, group: &str) -> Project {
        Project {
            code: code.into(),
            name: format!("Project {code}"),
            group_code: group.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn participation(employee: &str, project: &str) -> Participation {
        Participation {
            employee_code: employee.into(),
            project_code: project.into(),
            joined_on: Utc::now().date_naive(),
            created_at: Utc::now(),
        }
    }

    fn p1() -> (FragmentId, Department) {
        (
            FragmentId::parse("p1").unwrap(),
            Department::parse("P1").unwrap(),
        )
    }

    #[test]
    fn consistent_rows_are_counted() {
        let (fragment, department) = p1();
        let counts = check_rows(
            &fragment,
            &department,
            &[group("NC01", "P1"), group("NC02", "P1")],
            &[employee("NV01", "NC01"), employee("NV03", "NC02")],
            &[project("DA01", "NC01")],
            &[participation("NV01", "DA01")],
        )
        .unwrap();

        assert_eq!(
            counts,
            TableCounts {
                groups: 2,
                employees: 2,
                projects: 1,
                participations: 1,
            }
        );
    }

    #[test]
    fn empty_fragment_is_consistent() {
        let (fragment, department) = p1();
        let counts = check_rows(&fragment, &department, &[], &[], &[], &[]).unwrap();
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn foreign_department_fails_verification() {
        let (fragment, department) = p1();
        let err = check_rows(&fragment, &department, &[group("NC03", "P2")], &[], &[], &[])
            .unwrap_err();

        assert_matches!(
            err,
            ProvisionError::Integrity { violations, .. }
                if violations == [Violation::WrongDepartment {
                    group: "NC03".into(),
                    found: "P2".into(),
                    expected: "P1".into(),
                }]
        );
    }

    #[test]
    fn dangling_participation_fails_verification() {
        let (fragment, department) = p1();
        let err = check_rows(
            &fragment,
            &department,
            &[group("NC01", "P1")],
            &[employee("NV01", "NC01")],
            &[],
            &[participation("NV01", "DA09")],
        )
        .unwrap_err();

        assert_matches!(err, ProvisionError::Integrity { violations, .. } if violations.len() == 1);
    }
}
