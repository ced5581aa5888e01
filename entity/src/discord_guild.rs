use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "discord_guild")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub guild_id: String,
    pub name: String,
    pub icon_hash: Option<String>,
    pub owner_id: String,
    pub member_count: i64,
    pub last_seen_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::guild_config::Entity")]
    GuildConfig,
    #[sea_orm(has_many = "super::antinuke_whitelist::Entity")]
    AntiNukeWhitelist,
    #[sea_orm(has_many = "super::antinuke_threshold::Entity")]
    AntiNukeThreshold,
    #[sea_orm(has_one = "super::lockdown::Entity")]
    Lockdown,
    #[sea_orm(has_many = "super::guild_snapshot::Entity")]
    GuildSnapshot,
    #[sea_orm(has_many = "super::pending_verification::Entity")]
    PendingVerification,
}

impl Related<super::guild_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GuildConfig.def()
    }
}

impl Related<super::lockdown::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lockdown.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
