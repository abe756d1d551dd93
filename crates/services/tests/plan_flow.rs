use std::sync::Arc;

use chrono::Duration;
use pace_core::model::PlanId;
use pace_core::pace::PaceStatus;
use pace_core::time::{fixed_clock, fixed_now};
use services::{PaceService, PlanService};
use storage::repository::Storage;

#[tokio::test]
async fn plan_flow_adopt_log_and_read_pace() {
    let storage = Storage::sqlite("sqlite:file:memdb_plan_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let clock = fixed_clock();
    let today = clock.today();

    let plan_service = PlanService::new(
        clock,
        Arc::clone(&storage.plans),
        Arc::clone(&storage.sessions),
    );
    let pace_service = PaceService::new(
        clock,
        Arc::clone(&storage.plans),
        Arc::clone(&storage.sessions),
    );

    let plan_id = PlanId::new(1);
    plan_service
        .adopt_plan(
            plan_id,
            "Rust track",
            600,
            today - Duration::days(23),
            today + Duration::days(59),
        )
        .await
        .expect("adopt plan");

    // A week of even study, backfilled day by day.
    for i in 0..7 {
        plan_service
            .log_session(plan_id, today - Duration::days(i), 60)
            .await
            .expect("log session");
    }

    let metrics = pace_service
        .metrics_for_plan(plan_id)
        .await
        .expect("metrics");
    assert_eq!(metrics.current_daily_avg_minutes, 60.0);
    assert_eq!(metrics.study_days_in_window, 7);
    assert_eq!(metrics.current_weekly_hours, 7.0);
    assert_eq!(metrics.remaining_minutes, 180);
    // 180 minutes left over 59 days needs ~4m/day; an hour a day clears it.
    assert_eq!(metrics.status, PaceStatus::OnTrack);
    assert_eq!(
        metrics.projected_finish_date,
        Some(today + Duration::days(3))
    );

    // Pushing the target out lowers the required pace, never the average.
    plan_service
        .set_dates(plan_id, today - Duration::days(23), today + Duration::days(120))
        .await
        .expect("set dates");
    let relaxed = pace_service
        .metrics_for_plan(plan_id)
        .await
        .expect("metrics after date edit");
    assert!(relaxed.required_minutes_per_day < metrics.required_minutes_per_day);
    assert_eq!(relaxed.current_daily_avg_minutes, 60.0);

    // Reset drops both the counter and the log; pace degrades accordingly.
    let plan = plan_service.reset_plan(plan_id).await.expect("reset");
    assert_eq!(plan.completed_minutes(), 0);

    let cold = pace_service
        .metrics_for_plan(plan_id)
        .await
        .expect("metrics after reset");
    assert_eq!(cold.progress_percent, 0);
    assert_eq!(cold.current_daily_avg_minutes, 0.0);
    assert_eq!(cold.status, PaceStatus::AtRisk);
    assert_eq!(cold.projected_finish_date, None);
}

#[tokio::test]
async fn identical_snapshots_are_bit_identical() {
    let storage = Storage::sqlite("sqlite:file:memdb_plan_pure?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let clock = fixed_clock();
    let today = clock.today();

    let plan_service = PlanService::new(
        clock,
        Arc::clone(&storage.plans),
        Arc::clone(&storage.sessions),
    );
    let pace_service = PaceService::new(
        clock,
        Arc::clone(&storage.plans),
        Arc::clone(&storage.sessions),
    );

    let plan_id = PlanId::new(1);
    plan_service
        .adopt_plan(
            plan_id,
            "Rust track",
            600,
            today - Duration::days(5),
            today + Duration::days(25),
        )
        .await
        .expect("adopt plan");
    plan_service
        .log_session(plan_id, today - Duration::days(1), 45)
        .await
        .expect("log session");

    let first = pace_service.metrics_for_plan(plan_id).await.expect("first");
    let second = pace_service
        .metrics_for_plan(plan_id)
        .await
        .expect("second");
    assert_eq!(first, second);

    // The engine never writes back: the stored plan is untouched by reads.
    let stored = plan_service.get_plan(plan_id).await.expect("get");
    assert_eq!(stored.completed_minutes(), 45);
    assert_eq!(stored.created_at(), fixed_now());
}
