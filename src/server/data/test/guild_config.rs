use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

use crate::server::{
    data::guild_config::GuildConfigRepository,
    model::guild_config::{ConfigUpdate, Feature, Punishment, DEFAULT_LOCKDOWN_MINUTES},
};

/// Tests that a guild without a stored row gets the defaults.
///
/// Expected: anti-nuke on, presence features off, strip_roles punishment
#[tokio::test]
async fn returns_defaults_without_row() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let config = GuildConfigRepository::new(db)
        .get_or_default(123456789012345678)
        .await?;

    assert!(config.anti_nuke_enabled);
    assert!(!config.status_roles_enabled);
    assert_eq!(config.lockdown_minutes, DEFAULT_LOCKDOWN_MINUTES);
    assert_eq!(config.punishment, Punishment::StripRoles);

    Ok(())
}

/// Tests saving an updated configuration twice for the same guild.
///
/// Expected: one row holding the latest values
#[tokio::test]
async fn save_upserts_by_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = GuildConfigRepository::new(db);

    let mut config = repo.get_or_default(guild_id).await?;
    config.apply(ConfigUpdate::ModLogChannel(Some(42)));
    repo.save(&config).await?;

    config.apply(ConfigUpdate::Feature(Feature::PhishingFilter, false));
    config.apply(ConfigUpdate::Punishment(Punishment::Ban));
    let saved = repo.save(&config).await?;

    assert_eq!(saved.mod_log_channel_id, Some(42));
    assert!(!saved.phishing_filter_enabled);
    assert_eq!(saved.punishment, Punishment::Ban);
    assert_eq!(entity::prelude::GuildConfig::find().count(db).await?, 1);

    Ok(())
}

/// Tests reading a row written by the factory.
///
/// Expected: stored punishment and lockdown duration are parsed
#[tokio::test]
async fn reads_stored_config() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    factory::guild_config::GuildConfigFactory::new(db, &guild.guild_id)
        .punishment("kick")
        .lockdown_minutes(10)
        .build()
        .await?;

    let config = GuildConfigRepository::new(db)
        .find_by_guild_id(guild.guild_id.parse().unwrap())
        .await?
        .unwrap();

    assert_eq!(config.punishment, Punishment::Kick);
    assert_eq!(config.lockdown_minutes, 10);

    Ok(())
}
