use sea_orm::DbErr;
use test_utils::builder::TestBuilder;

use crate::server::data::activity_stat::ActivityStatRepository;

/// Tests that repeated observations accumulate in one bucket.
///
/// Expected: count of 3 for (hour 14, online) and a separate bucket for idle
#[tokio::test]
async fn increments_bucket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_log_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ActivityStatRepository::new(db);
    for _ in 0..3 {
        repo.increment(1, 14, "online").await?;
    }
    repo.increment(1, 14, "idle").await?;
    repo.increment(2, 14, "online").await?;

    let stats = repo.get_by_guild(1).await?;

    assert_eq!(stats.len(), 2);
    let online = stats.iter().find(|s| s.status == "online").unwrap();
    assert_eq!(online.count, 3);
    assert_eq!(online.hour, 14);

    Ok(())
}
