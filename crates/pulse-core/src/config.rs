// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

use crate::{
    DEFAULT_DATA_ROOT, DEFAULT_DB_FILE, ENV_DB_NAME, ENV_PULSE_DATA_ROOT, ENV_PULSE_DB_PATH,
    ENV_PULSE_LOG_JSON,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseConfig {
    pub db_path: PathBuf,
    pub data_root: PathBuf,
    pub log_json: bool,
}

impl PulseConfig {
    /// Loads `.env` from the working directory (if any) and resolves the
    /// process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            db_path: resolve_db_path(&lookup),
            data_root: resolve_data_root(&lookup),
            log_json: parse_bool(lookup(ENV_PULSE_LOG_JSON).as_deref()).unwrap_or(false),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[must_use]
pub fn resolve_db_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(explicit) = non_empty(lookup(ENV_PULSE_DB_PATH)) {
        return PathBuf::from(explicit);
    }
    if let Some(name) = non_empty(lookup(ENV_DB_NAME)) {
        if name.ends_with(".sqlite") || name.ends_with(".db") {
            return PathBuf::from(name);
        }
        return PathBuf::from(format!("{name}.sqlite"));
    }
    PathBuf::from(DEFAULT_DB_FILE)
}

#[must_use]
pub fn resolve_data_root<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(ENV_PULSE_DATA_ROOT))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT))
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw?.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let cfg = PulseConfig::from_lookup(lookup_from(&[]));
        assert_eq!(cfg.db_path, PathBuf::from("pulse.sqlite"));
        assert_eq!(cfg.data_root, PathBuf::from("data"));
        assert!(!cfg.log_json);
    }

    #[test]
    fn explicit_db_path_wins_over_legacy_name() {
        let cfg = PulseConfig::from_lookup(lookup_from(&[
            ("PULSE_DB_PATH", "/tmp/store.sqlite"),
            ("DB_NAME", "phonepe"),
        ]));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/store.sqlite"));
    }

    #[test]
    fn legacy_db_name_gets_sqlite_suffix() {
        let cfg = PulseConfig::from_lookup(lookup_from(&[("DB_NAME", " phonepe ")]));
        assert_eq!(cfg.db_path, PathBuf::from("phonepe.sqlite"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = PulseConfig::from_lookup(lookup_from(&[
            ("PULSE_DATA_ROOT", "   "),
            ("PULSE_LOG_JSON", "yes"),
        ]));
        assert_eq!(cfg.data_root, PathBuf::from("data"));
        assert!(cfg.log_json);
    }
}
