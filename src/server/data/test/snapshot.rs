use sea_orm::DbErr;
use test_utils::{
    builder::TestBuilder,
    factory,
    serenity::{create_test_guild_with, role_json},
};

use crate::server::{data::snapshot::SnapshotRepository, model::snapshot::SnapshotData};

/// Tests storing a snapshot and reading it back as the latest.
///
/// Expected: structure is deserialized intact
#[tokio::test]
async fn stores_and_reads_latest_snapshot() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let gateway_guild = create_test_guild_with(
        guild_id,
        "Backup Guild",
        vec![role_json(guild_id, "@everyone", 0, 0, 0)],
        &[(11, "general", 0, None)],
    );
    let data = SnapshotData::from_guild(&gateway_guild);
    let repo = SnapshotRepository::new(db);

    repo.create(guild_id, "full", "first", &data).await?;
    repo.create(guild_id, "full", "second", &data).await?;

    let latest = repo.get_latest(guild_id).await?.unwrap();

    assert_eq!(latest.data, data);
    assert_eq!(repo.get_by_guild(guild_id, 10).await?.len(), 2);

    Ok(())
}

/// Tests a guild without backups.
///
/// Expected: Ok(None)
#[tokio::test]
async fn latest_is_none_without_snapshots() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;

    let latest = SnapshotRepository::new(db)
        .get_latest(guild.guild_id.parse().unwrap())
        .await?;

    assert!(latest.is_none());

    Ok(())
}
