use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub locationiq_key: String,
    pub locationiq_url: String,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        Ok(Self {
            port: try_load("HAULMAP_PORT", "3000")?,
            locationiq_key: try_load("LOCATIONIQ_KEY", "")?,
            locationiq_url: try_load("LOCATIONIQ_URL", "https://us1.locationiq.com")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default:?}");
            default.to_string()
        })
        .parse()
        .map_err(|err| {
            warn!("Invalid {key} value: {err}");
            format!("{key} is misconfigured")
        })
}
