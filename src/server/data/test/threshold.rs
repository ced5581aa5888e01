use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::server::{
    data::threshold::ThresholdRepository,
    model::antinuke::{ActionKind, Threshold},
};

/// Tests that kinds without an override resolve to their default.
///
/// Expected: channel delete default of 3 in 10 seconds
#[tokio::test]
async fn resolves_default_without_override() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;

    let threshold = ThresholdRepository::new(db)
        .resolve(guild.guild_id.parse().unwrap(), ActionKind::ChannelDelete)
        .await?;

    assert_eq!(threshold, ActionKind::ChannelDelete.default_threshold());
    assert_eq!(threshold.limit, 3);

    Ok(())
}

/// Tests setting an override twice.
///
/// Expected: the second value replaces the first and other kinds are untouched
#[tokio::test]
async fn set_replaces_existing_override() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = ThresholdRepository::new(db);

    repo.set(guild_id, ActionKind::MemberBan, Threshold::new(10, 60))
        .await?;
    repo.set(guild_id, ActionKind::MemberBan, Threshold::new(2, 30))
        .await?;

    let overrides = repo.get_by_guild(guild_id).await?;

    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[&ActionKind::MemberBan], Threshold::new(2, 30));
    assert_eq!(
        repo.resolve(guild_id, ActionKind::MemberKick).await?,
        ActionKind::MemberKick.default_threshold()
    );

    Ok(())
}
