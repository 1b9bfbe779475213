use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

use crate::runtime::DEFAULT_FALLBACK_MARGIN;

pub const DEFAULT_LESSON_PATH: &str = "demos/lessons/peste-negra.yaml";

const LESSON_VAR: &str = "LESSONFLOW_LESSON";
const FALLBACK_MARGIN_VAR: &str = "LESSONFLOW_FALLBACK_MARGIN_SECS";
const MUTED_VAR: &str = "LESSONFLOW_MUTED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub lesson_path: PathBuf,
    pub fallback_margin: Duration,
    pub muted: bool,
}

impl Config {
    pub fn new(lesson_path: impl Into<PathBuf>) -> Self {
        Self {
            lesson_path: lesson_path.into(),
            fallback_margin: DEFAULT_FALLBACK_MARGIN,
            muted: false,
        }
    }

    /// Reads `.env` (when present) and the process environment; the first
    /// argument, if any, overrides the lesson path.
    pub fn from_env(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    pub fn from_lookup(
        mut args: impl Iterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let lesson_path = args
            .next()
            .or_else(|| lookup(LESSON_VAR))
            .unwrap_or_else(|| DEFAULT_LESSON_PATH.to_string());

        let mut config = Config::new(lesson_path);

        if let Some(margin) = lookup(FALLBACK_MARGIN_VAR) {
            let secs: u64 = margin
                .trim()
                .parse()
                .with_context(|| format!("{FALLBACK_MARGIN_VAR} must be a whole number of seconds, got '{margin}'"))?;
            config.fallback_margin = Duration::from_secs(secs);
        }

        if let Some(muted) = lookup(MUTED_VAR) {
            config.muted = parse_flag(&muted).with_context(|| format!("{MUTED_VAR} is not a flag"))?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("expected true or false, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(args: &[&str], vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(args.iter().map(|a| a.to_string()), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_input() {
        let config = config(&[], &[]).unwrap();
        assert_eq!(config, Config::new(DEFAULT_LESSON_PATH));
        assert_eq!(config.fallback_margin, Duration::from_secs(1));
        assert!(!config.muted);
    }

    #[test]
    fn argument_overrides_environment() {
        let from_arg = config(&["cli.yaml"], &[(LESSON_VAR, "env.yaml")]).unwrap();
        assert_eq!(from_arg.lesson_path, PathBuf::from("cli.yaml"));

        let from_env = config(&[], &[(LESSON_VAR, "env.yaml")]).unwrap();
        assert_eq!(from_env.lesson_path, PathBuf::from("env.yaml"));
    }

    #[test]
    fn margin_and_mute_are_read() {
        let config = config(&[], &[(FALLBACK_MARGIN_VAR, "3"), (MUTED_VAR, "Yes")]).unwrap();
        assert_eq!(config.fallback_margin, Duration::from_secs(3));
        assert!(config.muted);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(config(&[], &[(FALLBACK_MARGIN_VAR, "-1")]).is_err());
        assert!(config(&[], &[(MUTED_VAR, "maybe")]).is_err());
    }
}
