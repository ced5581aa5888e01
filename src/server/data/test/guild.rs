use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory, serenity::create_test_guild};

use crate::server::data::guild::DiscordGuildRepository;

/// Tests upserting a guild that has never been seen.
///
/// Expected: Ok with the owner and member count taken from the gateway guild
#[tokio::test]
async fn upserts_new_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = create_test_guild(123456789012345678, "Nexus HQ", Some("abc123"));

    let stored = DiscordGuildRepository::new(db).upsert(&guild).await?;

    assert_eq!(stored.guild_id, 123456789012345678);
    assert_eq!(stored.name, "Nexus HQ");
    assert_eq!(stored.owner_id, 100000000000000000);
    assert_eq!(stored.member_count, 100);
    assert_eq!(
        stored.icon_hash,
        Some("abc12300000000000000000000000000".to_string())
    );

    Ok(())
}

/// Tests that a second upsert updates the existing row instead of duplicating it.
///
/// Expected: Ok with one row carrying the new name
#[tokio::test]
async fn updates_existing_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::discord_guild::DiscordGuildFactory::new(db)
        .guild_id("123456789012345678")
        .name("Old Name")
        .build()
        .await?;

    let guild = create_test_guild(123456789012345678, "New Name", None);
    let stored = DiscordGuildRepository::new(db).upsert(&guild).await?;

    assert_eq!(stored.name, "New Name");
    assert_eq!(entity::prelude::DiscordGuild::find().count(db).await?, 1);

    Ok(())
}

/// Tests lookup of a missing guild.
///
/// Expected: Ok(None)
#[tokio::test]
async fn find_returns_none_for_unknown_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_guild(db).await?;

    let found = DiscordGuildRepository::new(db)
        .find_by_guild_id(999999999999999999)
        .await?;

    assert!(found.is_none());

    Ok(())
}

/// Tests that deleting a guild cascades to its configuration.
///
/// Expected: Ok with both rows gone
#[tokio::test]
async fn delete_cascades_to_config() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (guild, _) = factory::create_guild_with_config(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();

    DiscordGuildRepository::new(db).delete(guild_id).await?;

    assert_eq!(entity::prelude::DiscordGuild::find().count(db).await?, 0);
    assert_eq!(entity::prelude::GuildConfig::find().count(db).await?, 0);

    Ok(())
}
