//! PostgreSQL adapter checks. Need a server reachable through
//! `DATABASE_URL`; run with `cargo test -- --ignored`.

use chrono::NaiveDate;
use sqlx::PgPool;

use phonebook_core::repositories::{CompositeWriter, DepartmentRepository, WorkerRepository};
use phonebook_core::services::birthday::MonthDay;
use phonebook_core::services::search::{SearchQuery, WorkerFilter};
use phonebook_core::{DepartmentDraft, DomainError, Partition, TenantRouter, WorkerProfile};
use phonebook_infrastructure::{PgCompositeWriter, PgDepartmentRepository, PgWorkerRepository};
use phonebook_shared::config::default_tenants;

fn partition(name: &str) -> Partition {
    TenantRouter::new(&default_tenants()).unwrap().resolve(name).unwrap()
}

fn worker(surname: &str, name: &str, email: &str) -> WorkerProfile {
    WorkerProfile {
        surname: surname.into(),
        name: name.into(),
        email: email.into(),
        phone_number: "100".into(),
        ..Default::default()
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn duplicate_email_maps_to_already_exists(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    repo.create(&grafit, &worker("Smith", "Ana", "a@x.ru")).await.unwrap();

    let dup = repo.create(&grafit, &worker("Brown", "Bob", "a@x.ru")).await;
    assert!(matches!(dup, Err(DomainError::AlreadyExists { entity: "worker", .. })));

    // other partition is independent
    repo.create(&partition("giredmet"), &worker("Smith", "Ana", "a@x.ru")).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn create_get_update_delete(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    let mut profile = worker("Smith", "Ana", "ana@x.ru");
    profile.birth_date = NaiveDate::from_ymd_opt(1985, 1, 1);

    let created = repo.create(&grafit, &profile).await.unwrap();
    assert_eq!(repo.find_by_email(&grafit, "ana@x.ru").await.unwrap(), created);

    profile.cabinet = Some("12".into());
    let updated = repo.update(&grafit, "ana@x.ru", &profile).await.unwrap();
    assert_eq!(updated.profile.cabinet.as_deref(), Some("12"));

    repo.delete(&grafit, "ana@x.ru").await.unwrap();
    assert!(matches!(repo.delete(&grafit, "ana@x.ru").await, Err(DomainError::NotFound { .. })));
    assert!(matches!(repo.find_by_email(&grafit, "ana@x.ru").await, Err(DomainError::NotFound { .. })));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn search_escapes_like_metacharacters(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    repo.create(&grafit, &worker("Smith", "Ana", "ana@x.ru")).await.unwrap();
    repo.create(&grafit, &worker("Brown", "Anatoly", "anatoly@x.ru")).await.unwrap();

    let found = repo.search(&grafit, &SearchQuery::new("ana sm", WorkerFilter::default())).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].profile.surname, "Smith");

    let wildcard = repo.search(&grafit, &SearchQuery::new("%", WorkerFilter::default())).await.unwrap();
    assert!(wildcard.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn birthdays_ignore_year(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    let mut jan1 = worker("NewYear", "X", "jan1@x.ru");
    jan1.birth_date = NaiveDate::from_ymd_opt(1985, 1, 1);
    let mut dec31 = worker("Eve", "X", "dec31@x.ru");
    dec31.birth_date = NaiveDate::from_ymd_opt(1990, 12, 31);
    repo.create(&grafit, &jan1).await.unwrap();
    repo.create(&grafit, &dec31).await.unwrap();

    let found = repo.birthdays_on(&grafit, MonthDay { month: 1, day: 1 }).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].profile.surname, "NewYear");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn import_rolls_back_on_duplicate(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool.clone());
    let writer = PgCompositeWriter::new(pool);
    let grafit = partition("grafit");
    repo.create(&grafit, &worker("Existing", "X", "w2@x.ru")).await.unwrap();

    let batch = vec![
        worker("A", "A", "w1@x.ru"),
        worker("B", "B", "w2@x.ru"),
        worker("C", "C", "w3@x.ru"),
    ];
    let result = writer.import_workers(&grafit, &batch).await;
    assert!(matches!(result, Err(DomainError::ImportAborted { position: 2, .. })));

    let all = repo.list(&grafit, &WorkerFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn failed_department_replace_keeps_old_rows(pool: PgPool) {
    let departments = PgDepartmentRepository::new(pool.clone());
    let writer = PgCompositeWriter::new(pool);
    let grafit = partition("grafit");
    writer
        .create_department(&grafit, &DepartmentDraft::new("Lab", vec!["A".into(), "B".into()]))
        .await
        .unwrap();

    let broken = DepartmentDraft::new("Lab 2", vec!["C".into(), "C".into()]);
    let result = writer.replace_department(&grafit, "Lab", &broken).await;
    assert!(matches!(result, Err(DomainError::AlreadyExists { entity: "section", .. })));

    let kept = departments.find_by_name(&grafit, "Lab").await.unwrap();
    assert_eq!(kept.section_names(), vec!["A", "B"]);
    assert!(matches!(
        departments.find_by_name(&grafit, "Lab 2").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn single_read_returns_photo_and_listing_omits_it(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    let mut profile = worker("Smith", "Ana", "ana@x.ru");
    profile.photo = Some(vec![0xFF, 0xD8]);

    let created = repo.create(&grafit, &profile).await.unwrap();
    let fetched = repo.find_by_email(&grafit, "ana@x.ru").await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.profile, profile);

    let listed = repo.list(&grafit, &WorkerFilter::default()).await.unwrap();
    assert_eq!(listed[0].profile.photo, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn attach_photo_only_fills_empty_slot(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    repo.create(&grafit, &worker("Smith", "Ana", "ana@x.ru")).await.unwrap();

    repo.attach_photo(&grafit, "ana@x.ru", vec![1]).await.unwrap();
    let second = repo.attach_photo(&grafit, "ana@x.ru", vec![2]).await;
    assert!(matches!(second, Err(DomainError::AlreadyExists { entity: "photo", .. })));
    assert_eq!(repo.find_photo(&grafit, "ana@x.ru").await.unwrap(), Some(vec![1]));

    let ghost = repo.attach_photo(&grafit, "ghost@x.ru", vec![1]).await;
    assert!(matches!(ghost, Err(DomainError::NotFound { .. })));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn guarded_update_skips_changed_row(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    let seen = repo.create(&grafit, &worker("Smith", "Ana", "ana@x.ru")).await.unwrap();

    let mut admin_edit = seen.profile.clone();
    admin_edit.cabinet = Some("101".into());
    repo.update(&grafit, "ana@x.ru", &admin_edit).await.unwrap();

    let mut user_edit = seen.profile.clone();
    user_edit.cabinet = Some("214".into());
    let applied = repo.update_if_unchanged(&grafit, "ana@x.ru", &seen.profile, &user_edit).await.unwrap();
    assert!(applied.is_none());
    let current = repo.find_by_email(&grafit, "ana@x.ru").await.unwrap();
    assert_eq!(current.profile.cabinet.as_deref(), Some("101"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn listing_orders_case_insensitively(pool: PgPool) {
    let repo = PgWorkerRepository::new(pool);
    let grafit = partition("grafit");
    for (surname, email) in [("Zimmer", "z@x.ru"), ("abbott", "a@x.ru"), ("Brown", "b@x.ru")] {
        repo.create(&grafit, &worker(surname, "X", email)).await.unwrap();
    }
    let listed = repo.list(&grafit, &WorkerFilter::default()).await.unwrap();
    let surnames: Vec<&str> = listed.iter().map(|w| w.profile.surname.as_str()).collect();
    assert_eq!(surnames, vec!["abbott", "Brown", "Zimmer"]);
}
