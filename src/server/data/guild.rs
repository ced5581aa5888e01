use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serenity::all::Guild;

use crate::server::model::guild::DiscordGuild;

pub struct DiscordGuildRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DiscordGuildRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or refreshes a guild from the gateway's view of it.
    ///
    /// Updates name, icon, owner, member count and `last_seen_at` on conflict.
    pub async fn upsert(&self, guild: &Guild) -> Result<DiscordGuild, DbErr> {
        let entity = entity::prelude::DiscordGuild::insert(entity::discord_guild::ActiveModel {
            guild_id: ActiveValue::Set(guild.id.get().to_string()),
            name: ActiveValue::Set(guild.name.clone()),
            icon_hash: ActiveValue::Set(guild.icon.map(|hash| hash.to_string())),
            owner_id: ActiveValue::Set(guild.owner_id.get().to_string()),
            member_count: ActiveValue::Set(guild.member_count as i64),
            last_seen_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(entity::discord_guild::Column::GuildId)
                .update_columns([
                    entity::discord_guild::Column::Name,
                    entity::discord_guild::Column::IconHash,
                    entity::discord_guild::Column::OwnerId,
                    entity::discord_guild::Column::MemberCount,
                    entity::discord_guild::Column::LastSeenAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        DiscordGuild::from_entity(entity)
    }

    pub async fn find_by_guild_id(&self, guild_id: u64) -> Result<Option<DiscordGuild>, DbErr> {
        entity::prelude::DiscordGuild::find()
            .filter(entity::discord_guild::Column::GuildId.eq(guild_id.to_string()))
            .one(self.db)
            .await?
            .map(DiscordGuild::from_entity)
            .transpose()
    }

    pub async fn get_all(&self) -> Result<Vec<DiscordGuild>, DbErr> {
        entity::prelude::DiscordGuild::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(DiscordGuild::from_entity)
            .collect()
    }

    /// Removes a guild and, through cascading foreign keys, its configuration.
    pub async fn delete(&self, guild_id: u64) -> Result<(), DbErr> {
        entity::prelude::DiscordGuild::delete_many()
            .filter(entity::discord_guild::Column::GuildId.eq(guild_id.to_string()))
            .exec(self.db)
            .await?;

        Ok(())
    }
}
