//! Schema and seed provisioning against a live PostgreSQL server.
//!
//! Each test gets a fresh database from `#[sqlx::test]`, which needs
//! `DATABASE_URL` to point at a server where the user may create
//! databases.

use std::time::{SystemTime, UNIX_EPOCH};

use research_core::fragment::{DatabaseName, Department, FragmentId, TableKind};
use research_core::seed::{SeedCatalog, SeedGroup};
use research_db::bootstrap::{create_database, database_exists, ensure_database};
use research_db::repositories::{EmployeeRepo, GroupRepo, ParticipationRepo, ProjectRepo};
use research_db::schema::{create_fragment_schema, table_exists};
use research_db::seed_loader::load_seed_data;
use sqlx::{Executor, PgPool};

fn fragment(name: &str, department: &str) -> (FragmentId, Department) {
    (
        FragmentId::parse(name).unwrap(),
        Department::parse(department).unwrap(),
    )
}

/// A database name no other test run uses.
fn unique_database(prefix: &str) -> DatabaseName {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    DatabaseName::parse(&format!("{prefix}_{}_{nanos}", std::process::id())).unwrap()
}

/// A missing database is created once; later calls find it and skip it.
#[sqlx::test(migrations = false)]
async fn test_ensure_database_creates_once(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let name = unique_database("research_bootstrap");

    assert!(!database_exists(&mut conn, &name).await.unwrap());
    assert!(ensure_database(&mut conn, &name).await.unwrap());
    assert!(database_exists(&mut conn, &name).await.unwrap());
    assert!(!ensure_database(&mut conn, &name).await.unwrap());

    // A plain CREATE is not idempotent.
    assert!(create_database(&mut conn, &name).await.is_err());

    let drop = format!("DROP DATABASE {}", name.quoted());
    (&mut *conn).execute(drop.as_str()).await.unwrap();
    assert!(!database_exists(&mut conn, &name).await.unwrap());
}

/// Creating the schema twice creates four tables once and errors never.
#[sqlx::test(migrations = false)]
async fn test_schema_creation_is_idempotent(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (p1, dept) = fragment("p1", "P1");

    let first = create_fragment_schema(&mut conn, &p1, &dept).await.unwrap();
    assert_eq!(
        first.created,
        ["nhomnc_p1", "nhanvien_p1", "dean_p1", "thamgia_p1"]
    );
    assert!(first.existing.is_empty());

    let second = create_fragment_schema(&mut conn, &p1, &dept).await.unwrap();
    assert!(second.is_noop());
    assert_eq!(second.existing.len(), 4);

    for kind in TableKind::ALL {
        assert!(table_exists(&mut conn, &p1.table(kind)).await.unwrap());
    }
}

/// Two fragments can live side by side in one database.
#[sqlx::test(migrations = false)]
async fn test_fragment_tables_are_disjoint(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (p1, d1) = fragment("p1", "P1");
    let (p2, d2) = fragment("p2", "P2");

    create_fragment_schema(&mut conn, &p1, &d1).await.unwrap();
    let report = create_fragment_schema(&mut conn, &p2, &d2).await.unwrap();

    assert_eq!(report.created.len(), 4);
    assert!(report.created.iter().all(|t| t.ends_with("_p2")));
}

/// The department check constraint rejects groups of another department.
#[sqlx::test(migrations = false)]
async fn test_group_department_is_enforced(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (p1, dept) = fragment("p1", "P1");
    create_fragment_schema(&mut conn, &p1, &dept).await.unwrap();

    let foreign = SeedGroup {
        code: "NC99".into(),
        name: "Misplaced Lab".into(),
        department: "P2".into(),
    };
    let err = GroupRepo::insert_if_absent(&mut conn, &p1, &foreign)
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.constraint(), Some("ck_nhomnc_p1_tenphong"));
}

/// Loading P1 twice inserts each row exactly once.
#[sqlx::test(migrations = false)]
async fn test_seed_loading_is_idempotent(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (p1, dept) = fragment("p1", "P1");
    let catalog = SeedCatalog::builtin();
    create_fragment_schema(&mut conn, &p1, &dept).await.unwrap();

    let first = load_seed_data(&mut conn, &p1, &dept, &catalog).await.unwrap();
    assert_eq!(first.inserted.groups, 2);
    assert_eq!(first.inserted.employees, 3);
    assert_eq!(first.inserted.projects, 2);
    assert_eq!(first.inserted.participations, 3);
    assert_eq!(first.skipped.total(), 0);

    let second = load_seed_data(&mut conn, &p1, &dept, &catalog).await.unwrap();
    assert_eq!(second.inserted.total(), 0);
    assert_eq!(second.skipped, first.inserted);

    let groups = GroupRepo::list(&mut conn, &p1).await.unwrap();
    let codes: Vec<&str> = groups.iter().map(|g| g.code.as_str()).collect();
    assert_eq!(codes, ["NC01", "NC02"]);
    assert_eq!(EmployeeRepo::list(&mut conn, &p1).await.unwrap().len(), 3);
    assert_eq!(ProjectRepo::list(&mut conn, &p1).await.unwrap().len(), 2);
    assert_eq!(ParticipationRepo::list(&mut conn, &p1).await.unwrap().len(), 3);
}

/// P2 receives two groups, three employees, three projects and three
/// participations, all within department P2.
#[sqlx::test(migrations = false)]
async fn test_p2_seed_contents(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let (p2, dept) = fragment("p2", "P2");
    create_fragment_schema(&mut conn, &p2, &dept).await.unwrap();
    load_seed_data(&mut conn, &p2, &dept, &SeedCatalog::builtin())
        .await
        .unwrap();

    let groups = GroupRepo::list(&mut conn, &p2).await.unwrap();
    let codes: Vec<&str> = groups.iter().map(|g| g.code.as_str()).collect();
    assert_eq!(codes, ["NC03", "NC04"]);
    assert!(groups.iter().all(|g| g.department == "P2"));

    let projects = ProjectRepo::list(&mut conn, &p2).await.unwrap();
    assert_eq!(projects.len(), 3);
    assert_eq!(projects[2].name, "Web Application Framework");

    let nc03 = EmployeeRepo::list_by_group(&mut conn, &p2, "NC03").await.unwrap();
    let names: Vec<&str> = nc03.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, ["Pham Van D", "Hoang Thi E"]);

    let participations = ParticipationRepo::list(&mut conn, &p2).await.unwrap();
    assert_eq!(participations.len(), 3);
    assert_eq!(participations[2].employee_code, "NV06");
    assert_eq!(participations[2].project_code, "DA04");
}

/// Every employee and project references a group of the same fragment.
#[sqlx::test(migrations = false)]
async fn test_group_references_resolve(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let catalog = SeedCatalog::builtin();

    for (name, code) in [("p1", "P1"), ("p2", "P2")] {
        let (frag, dept) = fragment(name, code);
        create_fragment_schema(&mut conn, &frag, &dept).await.unwrap();
        load_seed_data(&mut conn, &frag, &dept, &catalog).await.unwrap();

        for employee in EmployeeRepo::list(&mut conn, &frag).await.unwrap() {
            let group = GroupRepo::find_by_code(&mut conn, &frag, &employee.group_code)
                .await
                .unwrap();
            assert!(group.is_some(), "{} has no group", employee.code);
        }
        for project in ProjectRepo::list(&mut conn, &frag).await.unwrap() {
            let group = GroupRepo::find_by_code(&mut conn, &frag, &project.group_code)
                .await
                .unwrap();
            assert!(group.is_some(), "{} has no group", project.code);
        }
    }
}
