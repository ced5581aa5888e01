use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub guild_id: String,
    pub mod_log_channel_id: Option<String>,
    pub anti_nuke_enabled: bool,
    pub phishing_filter_enabled: bool,
    pub presence_verification_enabled: bool,
    pub status_roles_enabled: bool,
    pub activity_analytics_enabled: bool,
    pub auto_backup_enabled: bool,
    pub gaming_role_id: Option<String>,
    pub streaming_role_id: Option<String>,
    pub verified_role_id: Option<String>,
    pub lockdown_minutes: i32,
    pub punishment: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discord_guild::Entity",
        from = "Column::GuildId",
        to = "super::discord_guild::Column::GuildId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DiscordGuild,
}

impl Related<super::discord_guild::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscordGuild.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
