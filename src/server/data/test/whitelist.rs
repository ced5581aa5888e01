use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::server::data::whitelist::WhitelistRepository;

/// Tests that adding the same user twice keeps a single entry.
///
/// Expected: second add returns None
#[tokio::test]
async fn add_is_idempotent() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = WhitelistRepository::new(db);

    assert!(repo.add(guild_id, 200, 1).await?.is_some());
    assert!(repo.add(guild_id, 200, 1).await?.is_none());
    assert_eq!(repo.get_by_guild(guild_id).await?.len(), 1);

    Ok(())
}

/// Tests that entries are scoped to their guild.
///
/// Expected: user whitelisted in one guild is not whitelisted in another
#[tokio::test]
async fn entries_are_per_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let first = factory::create_guild(db).await?;
    let second = factory::create_guild(db).await?;
    factory::create_whitelist_entry(db, &first.guild_id, "300").await?;

    let repo = WhitelistRepository::new(db);

    assert!(repo.contains(first.guild_id.parse().unwrap(), 300).await?);
    assert!(!repo.contains(second.guild_id.parse().unwrap(), 300).await?);

    Ok(())
}

/// Tests removal of present and absent entries.
///
/// Expected: true then false
#[tokio::test]
async fn remove_reports_whether_deleted() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    factory::create_whitelist_entry(db, &guild.guild_id, "400").await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = WhitelistRepository::new(db);

    assert!(repo.remove(guild_id, 400).await?);
    assert!(!repo.remove(guild_id, 400).await?);

    Ok(())
}
