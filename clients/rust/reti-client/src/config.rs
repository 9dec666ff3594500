use dotenv::from_filename;
use envconfig::Envconfig;
use log::debug;
use retitypecrate::constants::DEFAULT_WAIT_ROUNDS;
use serde::{Deserialize, Serialize};

/// Contract identifiers and submission settings a [`crate::Reti`] is built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub registry_app_id: u64,
    /// Read from the registry's global state when not set.
    pub pool_template_app_id: Option<u64>,
    /// Rounds to wait for a committed group to confirm.
    pub wait_rounds: u64,
}

impl Config {
    pub fn new(registry_app_id: u64) -> Self {
        Config {
            registry_app_id,
            pool_template_app_id: None,
            wait_rounds: DEFAULT_WAIT_ROUNDS,
        }
    }
}

#[derive(Envconfig, Debug, Clone)]
pub struct RetiEnvConfig {
    #[envconfig(from = "RETI_APPID")]
    pub registry_app_id: u64,
    #[envconfig(from = "RETI_POOL_TEMPLATE_APPID", default = "0")]
    pub pool_template_app_id: u64,
    #[envconfig(from = "RETI_WAIT_ROUNDS", default = "4")]
    pub wait_rounds: u64,
    /// Local node number, used when loading validator info.
    #[envconfig(from = "RETI_NODENUM", default = "1")]
    pub node_num: u64,
}

impl From<&RetiEnvConfig> for Config {
    fn from(env: &RetiEnvConfig) -> Self {
        Config {
            registry_app_id: env.registry_app_id,
            pool_template_app_id: (env.pool_template_app_id != 0)
                .then_some(env.pool_template_app_id),
            wait_rounds: env.wait_rounds,
        }
    }
}

/// Loads `.env.local` then `.env`. Missing files are skipped and variables
/// already set take precedence.
pub fn load_env_settings() {
    for file in [".env.local", ".env"] {
        if from_filename(file).is_ok() {
            debug!("loaded settings from {}", file);
        }
    }
}

/// Loads `.env.<network>`, e.g. `.env.testnet`.
pub fn load_env_for_network(network: &str) {
    let file = format!(".env.{network}");
    if from_filename(&file).is_ok() {
        debug!("loaded settings from {}", file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn env_config_defaults() {
        let env = HashMap::from([("RETI_APPID".to_string(), "1234".to_string())]);
        let env_config = RetiEnvConfig::init_from_hashmap(&env).unwrap();
        assert_eq!(env_config.node_num, 1);

        let config = Config::from(&env_config);
        assert_eq!(
            config,
            Config {
                registry_app_id: 1234,
                pool_template_app_id: None,
                wait_rounds: DEFAULT_WAIT_ROUNDS,
            }
        );
    }

    #[test]
    fn env_config_with_template() {
        let env = HashMap::from([
            ("RETI_APPID".to_string(), "1234".to_string()),
            ("RETI_POOL_TEMPLATE_APPID".to_string(), "99".to_string()),
            ("RETI_WAIT_ROUNDS".to_string(), "10".to_string()),
        ]);
        let config = Config::from(&RetiEnvConfig::init_from_hashmap(&env).unwrap());
        assert_eq!(config.pool_template_app_id, Some(99));
        assert_eq!(config.wait_rounds, 10);
    }

    #[test]
    fn env_config_requires_registry_app() {
        assert!(RetiEnvConfig::init_from_hashmap(&HashMap::new()).is_err());
    }
}
