//! Guild lockdown: revoking `@everyone` send/react/connect permissions and restoring them.

use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::DatabaseConnection;
use serenity::{
    all::{EditRole, GuildId, Permissions, RoleId},
    http::Http,
};

use crate::server::{
    data::lockdown::LockdownRepository,
    error::{log_bot_error, AppError},
    model::antinuke::LockdownState,
};

/// Permissions removed from `@everyone` while a guild is locked down.
pub fn revoked_permissions() -> Permissions {
    Permissions::SEND_MESSAGES
        | Permissions::SEND_MESSAGES_IN_THREADS
        | Permissions::ADD_REACTIONS
        | Permissions::CREATE_PUBLIC_THREADS
        | Permissions::CREATE_PRIVATE_THREADS
        | Permissions::CONNECT
}

pub fn locked_permissions(current: Permissions) -> Permissions {
    current & !revoked_permissions()
}

pub fn lockdown_expiry(now: DateTime<Utc>, minutes: i32) -> DateTime<Utc> {
    now + TimeDelta::minutes(minutes.max(1) as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LockOutcome {
    /// The guild was already locked; nothing was changed.
    AlreadyLocked(LockdownState),
    Locked(LockdownState),
}

pub struct LockdownService<'a> {
    db: &'a DatabaseConnection,
    http: &'a Http,
}

impl<'a> LockdownService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: &'a Http) -> Self {
        Self { db, http }
    }

    /// Locks a guild down for `minutes`.
    ///
    /// The current `@everyone` permissions are stored so [`Self::unlock`] can restore them
    /// exactly, including bits the lockdown does not touch. The row is written before the
    /// role is edited and removed again if the edit fails, so a locked guild always has a row.
    pub async fn lock(
        &self,
        guild_id: u64,
        reason: &str,
        minutes: i32,
    ) -> Result<LockOutcome, AppError> {
        let repo = LockdownRepository::new(self.db);

        if let Some(existing) = repo.find_by_guild_id(guild_id).await? {
            return Ok(LockOutcome::AlreadyLocked(existing));
        }

        let current = self.everyone_permissions(guild_id).await?;

        let state = match self.claim(guild_id, reason, current, minutes).await? {
            LockOutcome::Locked(state) => state,
            already => return Ok(already),
        };

        let edited = GuildId::new(guild_id)
            .edit_role(
                self.http,
                RoleId::new(guild_id),
                EditRole::new()
                    .permissions(locked_permissions(current))
                    .audit_log_reason(reason),
            )
            .await;

        if let Err(e) = edited {
            if let Err(db_err) = repo.delete(guild_id).await {
                tracing::error!(
                    "Failed to remove lockdown row of guild {} after a failed lock: {}",
                    guild_id,
                    db_err
                );
            }
            return Err(e.into());
        }

        tracing::warn!(
            "Guild {} locked down until {}: {}",
            guild_id,
            state.expires_at,
            reason
        );

        Ok(LockOutcome::Locked(state))
    }

    /// Writes the lockdown row. The unique guild key makes this the lock itself: when a
    /// concurrent breach got there first, its row is returned as `AlreadyLocked`.
    pub async fn claim(
        &self,
        guild_id: u64,
        reason: &str,
        previous: Permissions,
        minutes: i32,
    ) -> Result<LockOutcome, AppError> {
        let repo = LockdownRepository::new(self.db);

        match repo
            .create(
                guild_id,
                reason,
                previous.bits(),
                lockdown_expiry(Utc::now(), minutes),
            )
            .await
        {
            Ok(state) => Ok(LockOutcome::Locked(state)),
            Err(e) => match repo.find_by_guild_id(guild_id).await? {
                Some(existing) => Ok(LockOutcome::AlreadyLocked(existing)),
                None => Err(e.into()),
            },
        }
    }

    /// Restores the stored `@everyone` permissions and removes the lockdown.
    ///
    /// Returns false when the guild was not locked down.
    pub async fn unlock(&self, guild_id: u64) -> Result<bool, AppError> {
        let repo = LockdownRepository::new(self.db);

        let Some(state) = repo.find_by_guild_id(guild_id).await? else {
            return Ok(false);
        };

        GuildId::new(guild_id)
            .edit_role(
                self.http,
                RoleId::new(guild_id),
                EditRole::new()
                    .permissions(Permissions::from_bits_truncate(state.previous_permissions))
                    .audit_log_reason("Lockdown lifted"),
            )
            .await?;

        repo.delete(guild_id).await?;

        tracing::info!("Guild {} lockdown lifted", guild_id);

        Ok(true)
    }

    /// Unlocks every lockdown that expired at or before `now`.
    ///
    /// Lockdowns of guilds or roles Discord no longer knows are dropped. Other failures are
    /// logged and retried on the next run.
    pub async fn unlock_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let repo = LockdownRepository::new(self.db);
        let expired = repo.get_expired(now).await?;

        let mut unlocked = 0;
        for state in expired {
            match self.unlock(state.guild_id).await {
                Ok(true) => unlocked += 1,
                Ok(false) => {}
                Err(e) if e.is_unknown_resource() => {
                    tracing::warn!(
                        "Dropping lockdown of unavailable guild {}: {}",
                        state.guild_id,
                        e
                    );
                    repo.delete(state.guild_id).await?;
                }
                Err(e) => log_bot_error(
                    &format!("Failed to lift lockdown of guild {}", state.guild_id),
                    &e,
                ),
            }
        }

        Ok(unlocked)
    }

    async fn everyone_permissions(&self, guild_id: u64) -> Result<Permissions, AppError> {
        let roles = self.http.get_guild_roles(GuildId::new(guild_id)).await?;

        roles
            .into_iter()
            .find(|role| role.id.get() == guild_id)
            .map(|role| role.permissions)
            .ok_or_else(|| AppError::NotFound(format!("@everyone role of guild {}", guild_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    #[test]
    fn locking_keeps_unrelated_permissions() {
        let current = Permissions::VIEW_CHANNEL
            | Permissions::SEND_MESSAGES
            | Permissions::ADD_REACTIONS
            | Permissions::CONNECT
            | Permissions::SPEAK;

        let locked = locked_permissions(current);

        assert!(locked.contains(Permissions::VIEW_CHANNEL | Permissions::SPEAK));
        assert!(!locked.intersects(revoked_permissions()));
    }

    #[test]
    fn expiry_is_at_least_one_minute_out() {
        let now = Utc::now();
        assert_eq!(lockdown_expiry(now, 30), now + TimeDelta::minutes(30));
        assert_eq!(lockdown_expiry(now, 0), now + TimeDelta::minutes(1));
    }

    /// Tests that a guild with an active lockdown is not locked a second time.
    ///
    /// Expected: AlreadyLocked with the stored state, no Discord call is made
    #[tokio::test]
    async fn does_not_relock_locked_guild() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        LockdownRepository::new(db)
            .create(guild_id, "first", 1024, Utc::now() + TimeDelta::minutes(5))
            .await?;

        let http = Http::new("");
        let outcome = LockdownService::new(db, &http)
            .lock(guild_id, "second", 30)
            .await?;

        match outcome {
            LockOutcome::AlreadyLocked(state) => assert_eq!(state.reason, "first"),
            other => panic!("expected AlreadyLocked, got {:?}", other),
        }

        Ok(())
    }

    /// Tests unlocking a guild that is not locked down.
    ///
    /// Expected: Ok(false)
    #[tokio::test]
    async fn unlock_without_lockdown_is_noop() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let http = Http::new("");
        assert!(!LockdownService::new(db, &http).unlock(77).await?);

        Ok(())
    }

    /// Tests that the expiry sweep ignores lockdowns that are still running.
    ///
    /// Expected: nothing unlocked, row kept
    #[tokio::test]
    async fn expiry_sweep_skips_running_lockdowns() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        LockdownRepository::new(db)
            .create(guild_id, "raid", 0, Utc::now() + TimeDelta::minutes(10))
            .await?;

        let http = Http::new("");
        let unlocked = LockdownService::new(db, &http)
            .unlock_expired(Utc::now())
            .await?;

        assert_eq!(unlocked, 0);
        assert!(LockdownRepository::new(db)
            .find_by_guild_id(guild_id)
            .await?
            .is_some());

        Ok(())
    }

    /// Tests claiming a lockdown for a guild that has no stored guild row.
    ///
    /// Expected: Err, and no lockdown row is left behind
    #[tokio::test]
    async fn claim_fails_cleanly_without_guild_row() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let http = Http::new("");
        let result = LockdownService::new(db, &http)
            .claim(77, "raid", Permissions::SEND_MESSAGES, 30)
            .await;

        assert!(result.is_err());
        assert!(LockdownRepository::new(db)
            .find_by_guild_id(77)
            .await?
            .is_none());

        Ok(())
    }

    /// Tests two breaches claiming the same guild.
    ///
    /// Expected: the first locks, the second sees the first's row
    #[tokio::test]
    async fn second_claim_reports_existing_lockdown() -> Result<(), AppError> {
        let test = TestBuilder::new().with_guild_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let guild_id: u64 = guild.guild_id.parse().unwrap();

        let http = Http::new("");
        let service = LockdownService::new(db, &http);

        let first = service
            .claim(guild_id, "first", Permissions::SEND_MESSAGES, 30)
            .await?;
        let second = service
            .claim(guild_id, "second", Permissions::empty(), 30)
            .await?;

        assert!(matches!(first, LockOutcome::Locked(_)));
        match second {
            LockOutcome::AlreadyLocked(state) => {
                assert_eq!(state.reason, "first");
                assert_eq!(state.previous_permissions, Permissions::SEND_MESSAGES.bits());
            }
            other => panic!("expected AlreadyLocked, got {:?}", other),
        }

        Ok(())
    }
}
