use sea_orm::{DbErr, EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory};

use crate::server::{
    data::verification::VerificationRepository, model::verification::VerificationKind,
};

/// Tests that issuing a second code replaces the first.
///
/// Expected: one pending row with the new code
#[tokio::test]
async fn upsert_replaces_pending_code() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = VerificationRepository::new(db);

    repo.upsert_pending(guild_id, 5, VerificationKind::Presence, "NX-AAAA", None)
        .await?;
    repo.upsert_pending(guild_id, 5, VerificationKind::Presence, "NX-BBBB", Some(77))
        .await?;

    let pending = repo.find(guild_id, 5).await?.unwrap();

    assert_eq!(pending.code, "NX-BBBB");
    assert_eq!(pending.verified_role_id, Some(77));
    assert_eq!(
        entity::prelude::PendingVerification::find().count(db).await?,
        1
    );

    Ok(())
}

/// Tests completing a verification.
///
/// Expected: row is removed
#[tokio::test]
async fn delete_completes_verification() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let guild = factory::create_guild(db).await?;
    let guild_id: u64 = guild.guild_id.parse().unwrap();
    let repo = VerificationRepository::new(db);

    repo.upsert_pending(guild_id, 5, VerificationKind::Presence, "NX-CCCC", None)
        .await?;

    assert!(repo.delete(guild_id, 5).await?);
    assert!(repo.find(guild_id, 5).await?.is_none());

    Ok(())
}
