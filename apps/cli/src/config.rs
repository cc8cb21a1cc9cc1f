// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

/// How JSON results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Compact,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tracing filter directive.
    pub log_filter: String,
    /// Multi-line, human-oriented log output.
    pub pretty_logs: bool,
    /// JSON output style.
    pub output: OutputFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_filter: lookup("GEOWRAP_LOG")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info,geowrap=debug".into()),
            pretty_logs: lookup("GEOWRAP_PRETTY_LOGS")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            output: lookup("GEOWRAP_OUTPUT")
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(OutputFormat::Pretty),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.log_filter, "info,geowrap=debug");
        assert!(!config.pretty_logs);
        assert_eq!(config.output, OutputFormat::Pretty);
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(|key| match key {
            "RUST_LOG" => Some("debug".into()),
            "GEOWRAP_PRETTY_LOGS" => Some("true".into()),
            "GEOWRAP_OUTPUT" => Some("Compact".into()),
            _ => None,
        });
        assert_eq!(config.log_filter, "debug");
        assert!(config.pretty_logs);
        assert_eq!(config.output, OutputFormat::Compact);
    }

    #[test]
    fn geowrap_log_wins_and_bad_output_falls_back() {
        let config = Config::from_lookup(|key| match key {
            "GEOWRAP_LOG" => Some("trace".into()),
            "RUST_LOG" => Some("debug".into()),
            "GEOWRAP_OUTPUT" => Some("yaml".into()),
            _ => None,
        });
        assert_eq!(config.log_filter, "trace");
        assert_eq!(config.output, OutputFormat::Pretty);
    }
}
