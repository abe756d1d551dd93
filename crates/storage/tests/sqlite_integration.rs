use chrono::{Duration, NaiveDate};
use pace_core::model::{Plan, PlanId, StudySession};
use pace_core::time::fixed_now;
use storage::repository::{PlanRepository, StudySessionRepository};
use storage::sqlite::SqliteRepository;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_plan(id: u64) -> Plan {
    Plan::new(
        PlanId::new(id),
        format!("Plan {id}"),
        6000,
        date(2026, 1, 1),
        date(2026, 3, 24),
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_persists_plan_progress() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_plan_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut plan = build_plan(1);
    plan.record_study(90);
    repo.upsert_plan(&plan).await.unwrap();

    let fetched = repo.get_plan(plan.id()).await.expect("fetch").unwrap();
    assert_eq!(fetched.title(), "Plan 1");
    assert_eq!(fetched.completed_minutes(), 90);
    assert_eq!(fetched.start_date(), date(2026, 1, 1));
    assert_eq!(fetched.target_date(), date(2026, 3, 24));

    // Upsert overwrites progress and dates in place.
    plan.record_study(30);
    plan.set_dates(date(2026, 1, 1), date(2026, 4, 1));
    repo.upsert_plan(&plan).await.unwrap();

    let fetched = repo.get_plan(plan.id()).await.expect("fetch").unwrap();
    assert_eq!(fetched.completed_minutes(), 120);
    assert_eq!(fetched.target_date(), date(2026, 4, 1));

    assert!(repo.get_plan(PlanId::new(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_lists_sessions_in_date_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sessions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let plan = build_plan(1);
    repo.upsert_plan(&plan).await.unwrap();

    let day = date(2026, 1, 24);
    // Appended out of order; the log itself is unordered.
    for (offset, minutes) in [(0_i64, 30_u32), (-2, 45), (-1, 60)] {
        let session = StudySession::new(plan.id(), day + Duration::days(offset), minutes);
        repo.append_session(&session).await.unwrap();
    }

    let sessions = repo.list_sessions(plan.id()).await.unwrap();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0].minutes_studied, 45);
    assert_eq!(sessions[2].minutes_studied, 30);

    let recent = repo
        .list_sessions_since(plan.id(), day - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);

    let removed = repo.delete_sessions_for_plan(plan.id()).await.unwrap();
    assert_eq!(removed, 3);
    assert!(repo.list_sessions(plan.id()).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_list_plans_orders_by_creation() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_plan_list?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for id in [2_u64, 1, 3] {
        repo.upsert_plan(&build_plan(id)).await.unwrap();
    }

    let plans = repo.list_plans(10).await.unwrap();
    assert_eq!(plans.len(), 3);
    // Same created_at for all three, so ids break the tie.
    assert_eq!(plans[0].id(), PlanId::new(1));
    assert_eq!(plans[2].id(), PlanId::new(3));

    let limited = repo.list_plans(2).await.unwrap();
    assert_eq!(limited.len(), 2);
}
