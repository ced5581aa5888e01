mod activity_stat;
mod guild;
mod guild_config;
mod lockdown;
mod snapshot;
mod threat;
mod threshold;
mod verification;
mod whitelist;
