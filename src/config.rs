use std::{env, net::SocketAddr, path::PathBuf};

use crate::{error::AppError, services::ride_store::CorruptStorePolicy};

pub const DEFAULT_STORAGE_KEY: &str = "cycletrack-rides";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub corrupt_store_policy: CorruptStorePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let data_dir = env::var("CYCLETRACK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let storage_key =
            env::var("CYCLETRACK_STORAGE_KEY").unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.is_empty() || storage_key.contains(['/', '\\']) {
            return Err(AppError::Config(format!(
                "invalid CYCLETRACK_STORAGE_KEY: {storage_key:?}"
            )));
        }

        let corrupt_store_policy = match env::var("CYCLETRACK_RESET_ON_CORRUPT") {
            Err(_) => CorruptStorePolicy::Fail,
            Ok(raw) => parse_reset_flag(&raw)?,
        };

        Ok(Self {
            listen_addr,
            data_dir,
            storage_key,
            corrupt_store_policy,
        })
    }
}

fn parse_reset_flag(raw: &str) -> Result<CorruptStorePolicy, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(CorruptStorePolicy::Reset),
        "" | "0" | "false" | "no" => Ok(CorruptStorePolicy::Fail),
        other => Err(AppError::Config(format!(
            "invalid CYCLETRACK_RESET_ON_CORRUPT: {other}"
        ))),
    }
}
