use fulldash_core::db::migrations::latest_version;
use fulldash_core::db::open_db_in_memory;
use fulldash_core::{
    Collaborator, Contribution, ContributionRepository, DashboardService, Project, ProjectDraft,
    ProjectListQuery, ProjectRepository, ProjectStatus, RepoError, SecuredBy, ServiceError,
    SplitMethod, SqliteContributionRepository, SqliteProjectRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn service(
    conn: &Connection,
) -> DashboardService<SqliteProjectRepository<'_>, SqliteContributionRepository<'_>> {
    DashboardService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteContributionRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let mut project = Project::new("Acme", SecuredBy::Ahmad);
    project.description = "landing page".to_string();
    project.revenue = 1200.5;
    let id = repo.create_project(&project).unwrap();

    let loaded = repo.get_project(id).unwrap().unwrap();
    assert_eq!(loaded.id, project.id);
    assert_eq!(loaded.client, "Acme");
    assert_eq!(loaded.description, "landing page");
    assert_eq!(loaded.revenue, 1200.5);
    assert_eq!(loaded.status, ProjectStatus::New);
    assert_eq!(loaded.secured_by, SecuredBy::Ahmad);
    assert_eq!(loaded.payment_ref, None);
    assert!(loaded.created_at > 0);
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let mut invalid = Project::new("Acme", SecuredBy::Both);
    invalid.revenue = -5.0;
    let create_err = repo.create_project(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::ProjectValidation(_)));

    let mut valid = Project::new("Acme", SecuredBy::Both);
    repo.create_project(&valid).unwrap();
    valid.client = "  ".to_string();
    let update_err = repo.update_project(&valid).unwrap_err();
    assert!(matches!(update_err, RepoError::ProjectValidation(_)));
}

#[test]
fn update_and_delete_missing_project_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let ghost = Project::new("Ghost", SecuredBy::Noor);
    assert!(matches!(repo.update_project(&ghost), Err(RepoError::NotFound(id)) if id == ghost.id));
    assert!(matches!(repo.delete_project(ghost.id), Err(RepoError::NotFound(_))));
    assert!(matches!(
        repo.set_status(ghost.id, ProjectStatus::Done),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn unknown_stored_secured_by_is_read_as_both() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let project = Project::new("Legacy", SecuredBy::Noor);
    repo.create_project(&project).unwrap();
    conn.execute(
        "UPDATE projects SET secured_by = 'partner' WHERE uuid = ?1;",
        [project.id.to_string()],
    )
    .unwrap();

    let loaded = repo.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.secured_by, SecuredBy::Both);
}

#[test]
fn list_filters_by_status_and_search() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let mut paid = Project::new("Acme Corp", SecuredBy::Noor);
    paid.status = ProjectStatus::Paid;
    paid.revenue = 10.0;
    let mut open = Project::new("Globex", SecuredBy::Ahmad);
    open.description = "acme referral".to_string();
    let other = Project::new("Initech", SecuredBy::Both);
    for item in [&paid, &open, &other] {
        repo.create_project(item).unwrap();
    }

    let paid_only = repo.list_paid_projects().unwrap();
    assert_eq!(paid_only.len(), 1);
    assert_eq!(paid_only[0].id, paid.id);

    let search = ProjectListQuery {
        search: Some("ACME".to_string()),
        ..ProjectListQuery::default()
    };
    let mut found: Vec<_> = repo
        .list_projects(&search)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    found.sort();
    let mut expected = vec![paid.id, open.id];
    expected.sort();
    assert_eq!(found, expected);

    let wildcard = ProjectListQuery {
        search: Some("%".to_string()),
        ..ProjectListQuery::default()
    };
    assert!(repo.list_projects(&wildcard).unwrap().is_empty());

    assert_eq!(repo.list_projects(&ProjectListQuery::default()).unwrap().len(), 3);
}

#[test]
fn list_orders_newest_first_then_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let ids = [
        "00000000-0000-4000-8000-000000000003",
        "00000000-0000-4000-8000-000000000001",
        "00000000-0000-4000-8000-000000000002",
    ];
    for id in ids {
        let project = Project::with_id(Uuid::parse_str(id).unwrap(), "c", SecuredBy::Both);
        repo.create_project(&project).unwrap();
    }
    conn.execute("UPDATE projects SET created_at = 1000;", []).unwrap();
    conn.execute(
        "UPDATE projects SET created_at = 2000 WHERE uuid = ?1;",
        [ids[0]],
    )
    .unwrap();

    let listed: Vec<String> = repo
        .list_projects(&ProjectListQuery::default())
        .unwrap()
        .into_iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(listed, vec![ids[0], ids[1], ids[2]]);
}

#[test]
fn contribution_upsert_keeps_one_entry_per_collaborator() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::try_new(&conn).unwrap();
    let contributions = SqliteContributionRepository::try_new(&conn).unwrap();

    let project = Project::new("Acme", SecuredBy::Both);
    projects.create_project(&project).unwrap();

    contributions
        .set_contribution(&Contribution::new(project.id, Collaborator::Noor, 2.0))
        .unwrap();
    let mut revised = Contribution::new(project.id, Collaborator::Noor, 6.5);
    revised.notes = Some("design + build".to_string());
    contributions.set_contribution(&revised).unwrap();

    let entries = contributions.list_contributions(project.id).unwrap();
    assert_eq!(entries, vec![revised]);

    contributions
        .clear_contribution(project.id, Collaborator::Noor)
        .unwrap();
    contributions
        .clear_contribution(project.id, Collaborator::Ahmad)
        .unwrap();
    assert!(contributions.list_contributions(project.id).unwrap().is_empty());
}

#[test]
fn contribution_rejects_negative_hours_and_unknown_project() {
    let conn = open_db_in_memory().unwrap();
    let contributions = SqliteContributionRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let negative = Contribution::new(missing, Collaborator::Ahmad, -1.0);
    assert!(matches!(
        contributions.set_contribution(&negative),
        Err(RepoError::ContributionValidation(_))
    ));

    let orphan = Contribution::new(missing, Collaborator::Ahmad, 1.0);
    assert!(matches!(
        contributions.set_contribution(&orphan),
        Err(RepoError::NotFound(id)) if id == missing
    ));
}

#[test]
fn deleting_project_cascades_contributions() {
    let conn = open_db_in_memory().unwrap();
    let projects = SqliteProjectRepository::try_new(&conn).unwrap();
    let contributions = SqliteContributionRepository::try_new(&conn).unwrap();

    let project = Project::new("Acme", SecuredBy::Both);
    projects.create_project(&project).unwrap();
    contributions
        .set_contribution(&Contribution::new(project.id, Collaborator::Ahmad, 3.0))
        .unwrap();

    projects.delete_project(project.id).unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM contributions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(projects.get_project(project.id).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteProjectRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_contributions_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE projects (uuid TEXT PRIMARY KEY);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(SqliteProjectRepository::try_new(&conn).is_ok());
    assert!(matches!(
        SqliteContributionRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("contributions"))
    ));
}

#[test]
fn service_create_persists_only_positive_hours() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut draft = ProjectDraft::new("  Acme  ", SecuredBy::Both);
    draft.noor_hours = 5.0;
    let detail = service.create_project(&draft).unwrap();

    assert_eq!(detail.project.client, "Acme");
    assert_eq!(detail.contributions.len(), 1);
    assert_eq!(detail.noor_hours, 5.0);
    assert_eq!(detail.ahmad_hours, 0.0);
    assert_eq!(detail.split.method, SplitMethod::None);
}

#[test]
fn service_update_clears_hours_set_to_zero() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut draft = ProjectDraft::new("Acme", SecuredBy::Noor);
    draft.revenue = 100.0;
    draft.status = ProjectStatus::Paid;
    draft.noor_hours = 3.0;
    draft.ahmad_hours = 1.0;
    let created = service.create_project(&draft).unwrap();
    assert_eq!(created.split.method, SplitMethod::Hours);
    assert_eq!(created.split.noor_share, 75.0);
    assert_eq!(created.split.ahmad_share, 25.0);

    draft.ahmad_hours = 0.0;
    let updated = service.update_project(created.project.id, &draft).unwrap();
    assert_eq!(updated.contributions.len(), 1);
    assert_eq!(updated.split.method, SplitMethod::Owner);
    assert_eq!(updated.split.noor_share, 100.0);
    assert_eq!(updated.split.ahmad_share, 0.0);
}

#[test]
fn service_update_missing_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let missing = Uuid::new_v4();

    let err = service
        .update_project(missing, &ProjectDraft::new("x", SecuredBy::Both))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(id) if id == missing));
    assert!(service.project_detail(missing).unwrap().is_none());
}

#[test]
fn service_payment_marks_paid_and_guards_reference_reuse() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service
        .create_project(&ProjectDraft::new("Acme", SecuredBy::Ahmad))
        .unwrap();
    let second = service
        .create_project(&ProjectDraft::new("Globex", SecuredBy::Noor))
        .unwrap();

    let paid = service
        .record_payment(first.project.id, 400.0, Some(" pi_123 "))
        .unwrap();
    assert_eq!(paid.project.status, ProjectStatus::Paid);
    assert_eq!(paid.project.revenue, 400.0);
    assert_eq!(paid.project.payment_ref.as_deref(), Some("pi_123"));
    assert_eq!(paid.split.ahmad_share, 400.0);

    service
        .record_payment(first.project.id, 450.0, Some("pi_123"))
        .unwrap();

    let err = service
        .record_payment(second.project.id, 10.0, Some("pi_123"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::DuplicatePaymentRef { existing, .. } if existing == first.project.id
    ));
}

#[test]
fn service_board_and_metrics_reflect_moves() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut paid = ProjectDraft::new("Acme", SecuredBy::Noor);
    paid.revenue = 100.0;
    paid.status = ProjectStatus::Paid;
    service.create_project(&paid).unwrap();

    let mut shared = ProjectDraft::new("Globex", SecuredBy::Both);
    shared.revenue = 50.0;
    shared.noor_hours = 1.0;
    shared.ahmad_hours = 1.0;
    let shared = service.create_project(&shared).unwrap();

    let board = service.board(None).unwrap();
    assert_eq!(board.paid.len(), 1);
    assert_eq!(board.new.len(), 1);

    let before = service.metrics().unwrap();
    assert_eq!(before.total_revenue, 100.0);
    assert_eq!(before.open_projects, 1);

    service
        .move_project(shared.project.id, ProjectStatus::Paid)
        .unwrap();
    let after = service.metrics().unwrap();
    assert_eq!(after.total_revenue, 150.0);
    assert_eq!(after.noor_share, 125.0);
    assert_eq!(after.ahmad_share, 25.0);
    assert_eq!(after.open_projects, 0);

    assert_eq!(service.board(Some("glob")).unwrap().len(), 1);

    service.delete_project(shared.project.id).unwrap();
    assert_eq!(service.metrics().unwrap().total_revenue, 100.0);
}

#[test]
fn service_create_with_invalid_hours_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for bad in [f64::INFINITY, f64::NAN, -2.0] {
        let mut draft = ProjectDraft::new("Acme", SecuredBy::Both);
        draft.ahmad_hours = 1.0;
        draft.noor_hours = bad;

        let err = service.create_project(&draft).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidHours {
                collaborator: Collaborator::Noor,
                ..
            }
        ));
    }

    assert!(service.board(None).unwrap().is_empty());
    let ledger_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM contributions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(ledger_rows, 0);
}

#[test]
fn service_update_with_invalid_hours_leaves_project_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut draft = ProjectDraft::new("Acme", SecuredBy::Noor);
    draft.revenue = 100.0;
    draft.noor_hours = 2.0;
    let created = service.create_project(&draft).unwrap();

    let mut edit = draft.clone();
    edit.client = "Renamed".to_string();
    edit.revenue = 900.0;
    edit.noor_hours = 0.0;
    edit.ahmad_hours = f64::INFINITY;
    let err = service.update_project(created.project.id, &edit).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidHours { .. }));

    let after = service.project_detail(created.project.id).unwrap().unwrap();
    assert_eq!(after, created);
}

#[test]
fn service_update_with_invalid_project_fields_keeps_hours() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut draft = ProjectDraft::new("Acme", SecuredBy::Both);
    draft.noor_hours = 4.0;
    let created = service.create_project(&draft).unwrap();

    let mut edit = draft.clone();
    edit.client = "   ".to_string();
    edit.noor_hours = 0.0;
    let err = service.update_project(created.project.id, &edit).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::ProjectValidation(_))));

    let after = service.project_detail(created.project.id).unwrap().unwrap();
    assert_eq!(after.noor_hours, 4.0);
    assert_eq!(after.project.client, "Acme");
}

#[test]
fn created_at_has_millisecond_resolution() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();

    let first = Project::with_id(
        Uuid::parse_str("ffffffff-0000-4000-8000-000000000000").unwrap(),
        "first",
        SecuredBy::Both,
    );
    let second = Project::with_id(
        Uuid::parse_str("00000000-0000-4000-8000-000000000000").unwrap(),
        "second",
        SecuredBy::Both,
    );
    repo.create_project(&first).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    repo.create_project(&second).unwrap();

    let first_at = repo.get_project(first.id).unwrap().unwrap().created_at;
    let second_at = repo.get_project(second.id).unwrap().unwrap().created_at;
    assert!(second_at > first_at, "{second_at} should be after {first_at}");

    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    assert!((now_ms - second_at).abs() < 60_000);

    let listed: Vec<_> = repo
        .list_projects(&ProjectListQuery::default())
        .unwrap()
        .into_iter()
        .map(|p| p.client)
        .collect();
    assert_eq!(listed, ["second", "first"]);
}
