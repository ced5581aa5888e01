//! Guild structure snapshots used for backups.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use serenity::all::Guild;

use super::parse_id;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoleSnapshot {
    pub id: u64,
    pub name: String,
    pub color: u32,
    pub position: u16,
    pub permissions: u64,
    pub hoist: bool,
    pub mentionable: bool,
    pub managed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelSnapshot {
    pub id: u64,
    pub name: String,
    pub kind: String,
    pub position: u16,
    pub parent_id: Option<u64>,
    pub nsfw: bool,
    pub topic: Option<String>,
}

/// Serialized structure of a guild at one point in time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotData {
    pub name: String,
    pub roles: Vec<RoleSnapshot>,
    pub channels: Vec<ChannelSnapshot>,
}

impl SnapshotData {
    /// Captures roles (highest first) and channels (by position) from a cached guild.
    pub fn from_guild(guild: &Guild) -> Self {
        let mut roles: Vec<RoleSnapshot> = guild
            .roles
            .values()
            .map(|role| RoleSnapshot {
                id: role.id.get(),
                name: role.name.clone(),
                color: role.colour.0,
                position: role.position,
                permissions: role.permissions.bits(),
                hoist: role.hoist,
                mentionable: role.mentionable,
                managed: role.managed,
            })
            .collect();
        roles.sort_by(|a, b| b.position.cmp(&a.position).then(a.id.cmp(&b.id)));

        let mut channels: Vec<ChannelSnapshot> = guild
            .channels
            .values()
            .map(|channel| ChannelSnapshot {
                id: channel.id.get(),
                name: channel.name.clone(),
                kind: channel.kind.name().to_string(),
                position: channel.position,
                parent_id: channel.parent_id.map(|id| id.get()),
                nsfw: channel.nsfw,
                topic: channel.topic.clone(),
            })
            .collect();
        channels.sort_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)));

        Self {
            name: guild.name.clone(),
            roles,
            channels,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuildSnapshot {
    pub id: i32,
    pub guild_id: u64,
    /// `full` for automatic and manual backups.
    pub kind: String,
    pub reason: String,
    pub data: SnapshotData,
    pub created_at: DateTime<Utc>,
}

impl GuildSnapshot {
    pub fn from_entity(entity: entity::guild_snapshot::Model) -> Result<Self, DbErr> {
        let data = serde_json::from_str(&entity.data)
            .map_err(|e| DbErr::Custom(format!("Failed to parse snapshot data: {}", e)))?;

        Ok(Self {
            id: entity.id,
            guild_id: parse_id("guild_id", &entity.guild_id)?,
            kind: entity.kind,
            reason: entity.reason,
            data,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::serenity::{create_test_guild_with, role_json};

    #[test]
    fn captures_roles_and_channels_in_order() {
        let guild = create_test_guild_with(
            123456789012345678,
            "Snapshot Guild",
            vec![
                role_json(2, "Member", 0x00FF00, 1, 0),
                role_json(3, "Admin", 0xFF0000, 5, 8),
            ],
            &[(10, "general", 0, None), (11, "rules", 0, None)],
        );

        let data = SnapshotData::from_guild(&guild);

        assert_eq!(data.name, "Snapshot Guild");
        assert_eq!(data.roles.len(), 2);
        assert_eq!(data.roles[0].name, "Admin");
        assert_eq!(data.roles[0].permissions, 8);
        assert_eq!(data.channels.len(), 2);
        assert_eq!(data.channels[0].kind, "text");
    }
}
