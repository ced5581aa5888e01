use crate::server::error::{internal::InternalError, AppError};

/// Parses a Discord id stored as a String.
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed id
/// - `Err(AppError::InternalErr(ParseStringId))` - The stored value is not a u64
pub fn parse_u64_from_string(value: &str) -> Result<u64, AppError> {
    let result = value
        .parse::<u64>()
        .map_err(|e| InternalError::ParseStringId {
            value: value.to_string(),
            source: e,
        })?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snowflake() {
        assert_eq!(
            parse_u64_from_string("123456789012345678").unwrap(),
            123456789012345678
        );
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(parse_u64_from_string("guild_1").is_err());
    }
}
