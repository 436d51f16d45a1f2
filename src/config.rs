//! Environment-driven configuration.
//!
//! Every knob has a default that matches the published protocol values;
//! only the PoH seed must agree across nodes for convergence.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::runtime::LedgerConfig;

/// Which driver this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Validator,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "leader" => Ok(Role::Leader),
            "validator" => Ok(Role::Validator),
            other => Err(format!("unknown LEDGER_ROLE '{other}' (leader|validator)")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Leader => f.write_str("leader"),
            Role::Validator => f.write_str("validator"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub role: Role,
    pub port: u16,
    pub poh_seed: String,
    pub tick_interval: Duration,
    pub ledger: LedgerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Leader,
            port: 8000,
            poh_seed: "genesis".to_string(),
            tick_interval: Duration::from_millis(25),
            ledger: LedgerConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or(default),
        Err(_) => default,
    }
}

impl NodeConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let role = env::var("LEDGER_ROLE")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.role);
        let ledger = LedgerConfig {
            hashes_per_tick: env_parse("HASHES_PER_TICK", defaults.ledger.hashes_per_tick).max(1),
            ticks_per_slot: env_parse("TICKS_PER_SLOT", defaults.ledger.ticks_per_slot).max(1),
            recent_hash_window: env_parse("RECENT_HASH_WINDOW", defaults.ledger.recent_hash_window)
                .max(1),
            max_slots: env_parse("MAX_SLOTS", defaults.ledger.max_slots).max(1),
        };
        Self {
            role,
            port: env_parse("PORT", defaults.port),
            poh_seed: env::var("POH_SEED").unwrap_or(defaults.poh_seed),
            tick_interval: Duration::from_millis(
                env_parse("TICK_INTERVAL_MS", defaults.tick_interval.as_millis() as u64).max(1),
            ),
            ledger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Leader".parse::<Role>(), Ok(Role::Leader));
        assert_eq!("VALIDATOR".parse::<Role>(), Ok(Role::Validator));
        assert!("miner".parse::<Role>().is_err());
    }

    #[test]
    fn defaults_match_the_published_knobs() {
        let config = NodeConfig::default();
        assert_eq!(config.ledger.hashes_per_tick, 64);
        assert_eq!(config.ledger.ticks_per_slot, 64);
        assert_eq!(config.ledger.recent_hash_window, 150);
    }
}
