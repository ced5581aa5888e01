use chrono::{Duration, Utc};
use sea_orm::DbErr;
use serde_json::json;
use test_utils::{builder::TestBuilder, factory::threat::ThreatFactory};

use crate::server::{
    data::threat::ThreatRepository,
    model::threat::{CreateThreatParam, Severity, THREAT_PHISHING},
};

/// Tests recording a threat with JSON details.
///
/// Expected: severity and details are stored
#[tokio::test]
async fn creates_threat() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_log_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let threat = ThreatRepository::new(db)
        .create(CreateThreatParam {
            guild_id: 1,
            user_id: Some(2),
            threat_type: THREAT_PHISHING.to_string(),
            severity: Severity::High,
            details: json!({ "confidence": 0.7 }),
        })
        .await?;

    assert_eq!(threat.severity, Severity::High);
    assert_eq!(threat.user_id, Some(2));
    assert!(threat.details.contains("confidence"));

    Ok(())
}

/// Tests the time filter and ordering of `get_since`.
///
/// Expected: only threats inside the window, newest first
#[tokio::test]
async fn get_since_filters_and_orders() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_log_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    ThreatFactory::new(db, "1")
        .reported_at(now - Duration::hours(30))
        .build()
        .await?;
    ThreatFactory::new(db, "1")
        .severity("critical")
        .reported_at(now - Duration::hours(2))
        .build()
        .await?;
    ThreatFactory::new(db, "1")
        .severity("low")
        .reported_at(now - Duration::hours(1))
        .build()
        .await?;
    ThreatFactory::new(db, "2").build().await?;

    let threats = ThreatRepository::new(db)
        .get_since(1, now - Duration::hours(24))
        .await?;

    assert_eq!(threats.len(), 2);
    assert_eq!(threats[0].severity, Severity::Low);
    assert_eq!(threats[1].severity, Severity::Critical);

    Ok(())
}

/// Tests that `get_recent` honours its limit.
///
/// Expected: at most `limit` rows
#[tokio::test]
async fn get_recent_limits_rows() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_log_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    for _ in 0..7 {
        ThreatFactory::new(db, "1").build().await?;
    }

    let threats = ThreatRepository::new(db).get_recent(1, 5).await?;

    assert_eq!(threats.len(), 5);

    Ok(())
}
