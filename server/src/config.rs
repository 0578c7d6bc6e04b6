use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid `{name}` environment variable `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub address: SocketAddr,
    /// Deadline for every ordinary reply.
    pub read_timeout: Duration,
    /// Deadline for each read while the robot is recharging.
    pub recharge_timeout: Duration,
    /// Obstacle detours allowed per session before giving up.
    pub max_obstacles: usize,
    /// Commands the robot may be sent on its way to the origin.
    pub max_commands: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, rover::PORT).into(),
            read_timeout: Duration::from_secs(1),
            recharge_timeout: Duration::from_secs(5),
            max_obstacles: 64,
            max_commands: 50_000,
        }
    }
}

impl Config {
    pub const ADDRESS_ENV: &'static str = "ROVER_ADDRESS";
    pub const READ_TIMEOUT_ENV: &'static str = "ROVER_READ_TIMEOUT_MS";
    pub const RECHARGE_TIMEOUT_ENV: &'static str = "ROVER_RECHARGE_TIMEOUT_MS";
    pub const MAX_OBSTACLES_ENV: &'static str = "ROVER_MAX_OBSTACLES";
    pub const MAX_COMMANDS_ENV: &'static str = "ROVER_MAX_COMMANDS";

    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(address) = parse(&var, Self::ADDRESS_ENV)? {
            config.address = address;
        }
        if let Some(millis) = parse(&var, Self::READ_TIMEOUT_ENV)? {
            config.read_timeout = Duration::from_millis(millis);
        }
        if let Some(millis) = parse(&var, Self::RECHARGE_TIMEOUT_ENV)? {
            config.recharge_timeout = Duration::from_millis(millis);
        }
        if let Some(max) = parse(&var, Self::MAX_OBSTACLES_ENV)? {
            config.max_obstacles = max;
        }
        if let Some(max) = parse(&var, Self::MAX_COMMANDS_ENV)? {
            config.max_commands = max;
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, Error> {
    var(name)
        .map(|value| value.parse().map_err(|_| Error::Invalid { name, value }))
        .transpose()
}
