use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::server::data::lockdown::LockdownRepository;

/// Tests creating and reading back a lockdown.
///
/// Expected: previous permissions survive the round trip through i64 storage
#[tokio::test]
async fn stores_previous_permissions() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = LockdownRepository::new(db);

    repo.create(
        guild_id,
        "Channel deletions",
        0x0006_4400_0000_0840,
        Utc::now() + Duration::minutes(30),
    )
    .await?;

    let state = repo.find_by_guild_id(guild_id).await?.unwrap();
    assert_eq!(state.previous_permissions, 0x0006_4400_0000_0840);
    assert_eq!(state.reason, "Channel deletions");
    assert!(!state.is_expired(Utc::now()));

    Ok(())
}

/// Tests that only lockdowns past their expiry are returned.
///
/// Expected: one expired lockdown out of two
#[tokio::test]
async fn get_expired_filters_by_expiry() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let expired = factory::create_guild(db).await?;
    let active = factory::create_guild(db).await?;
    let repo = LockdownRepository::new(db);
    let now = Utc::now();

    repo.create(expired.guild_id.parse().unwrap(), "old", 0, now - Duration::minutes(1))
        .await?;
    repo.create(active.guild_id.parse().unwrap(), "new", 0, now + Duration::minutes(29))
        .await?;

    let found = repo.get_expired(now).await?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].guild_id, expired.guild_id.parse::<u64>().unwrap());

    Ok(())
}

/// Tests deletion.
///
/// Expected: true for an existing lockdown, false afterwards
#[tokio::test]
async fn delete_removes_lockdown() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = LockdownRepository::new(db);

    repo.create(guild_id, "test", 0, Utc::now()).await?;

    assert!(repo.delete(guild_id).await?);
    assert!(!repo.delete(guild_id).await?);
    assert!(repo.find_by_guild_id(guild_id).await?.is_none());

    Ok(())
}
