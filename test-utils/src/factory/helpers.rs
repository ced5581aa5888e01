use sea_orm::{DatabaseConnection, DbErr};

static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Returns a process-wide unique value for building test identifiers.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Returns a unique snowflake-shaped id (18 digits).
pub fn next_snowflake() -> String {
    (100_000_000_000_000_000 + next_id()).to_string()
}

/// Creates a guild together with its default configuration row.
///
/// # Returns
/// - `Ok((guild, config))` - Both created rows
/// - `Err(DbErr)` - Database error during creation
pub async fn create_guild_with_config(
    db: &DatabaseConnection,
) -> Result<(entity::discord_guild::Model, entity::guild_config::Model), DbErr> {
    let guild = crate::factory::discord_guild::create_guild(db).await?;
    let config = crate::factory::guild_config::create_guild_config(db, &guild.guild_id).await?;

    Ok((guild, config))
}
