//! Lookups over resolved command options.

use serenity::all::{ResolvedOption, ResolvedValue, Role, User};

/// The invoked subcommand (or group) and its own options.
pub fn subcommand<'o, 'a>(
    options: &'o [ResolvedOption<'a>],
) -> Option<(&'a str, &'o [ResolvedOption<'a>])> {
    options.first().and_then(|option| match &option.value {
        ResolvedValue::SubCommand(inner) | ResolvedValue::SubCommandGroup(inner) => {
            Some((option.name, inner.as_slice()))
        }
        _ => None,
    })
}

fn find<'o, 'a>(options: &'o [ResolvedOption<'a>], name: &str) -> Option<&'o ResolvedValue<'a>> {
    options
        .iter()
        .find(|option| option.name == name)
        .map(|option| &option.value)
}

pub fn string<'a>(options: &[ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    match find(options, name)? {
        ResolvedValue::String(value) => Some(*value),
        _ => None,
    }
}

pub fn integer(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    match find(options, name)? {
        ResolvedValue::Integer(value) => Some(*value),
        _ => None,
    }
}

pub fn boolean(options: &[ResolvedOption<'_>], name: &str) -> Option<bool> {
    match find(options, name)? {
        ResolvedValue::Boolean(value) => Some(*value),
        _ => None,
    }
}

pub fn role<'a>(options: &[ResolvedOption<'a>], name: &str) -> Option<&'a Role> {
    match find(options, name)? {
        ResolvedValue::Role(role) => Some(*role),
        _ => None,
    }
}

pub fn user<'a>(options: &[ResolvedOption<'a>], name: &str) -> Option<&'a User> {
    match find(options, name)? {
        ResolvedValue::User(user, _) => Some(*user),
        _ => None,
    }
}

/// Id of a channel option.
pub fn channel_id(options: &[ResolvedOption<'_>], name: &str) -> Option<u64> {
    match find(options, name)? {
        ResolvedValue::Channel(channel) => Some(channel.id.get()),
        _ => None,
    }
}
