//! Command-line parsing and validation helpers.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::{fs, path::Path, time::Duration};

const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
const MIN_TICK_INTERVAL_MS: u64 = 10;
const MAX_TICK_INTERVAL_MS: u64 = 60_000;
const DEFAULT_COMPOSER_TARGET: &str = "sys.email.composer";
const MAX_TARGET_LEN: usize = 256;
// Commands are spawned directly, never through a shell, but reject
// metacharacters anyway so a copied value cannot smuggle anything past a
// future caller that does use one.
const FORBIDDEN_COMMAND_CHARS: &[char] = &[';', '|', '&', '$', '`', '<', '>', '\'', '"'];

/// How the compose payload is handed to the invocation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadMode {
    /// Flat `mailto:` URI passed to the opener command.
    Mailto,
    /// JSON descriptor written to the invoke command's stdin.
    Structured,
}

/// CLI options for the composer bridge. Validated values keep the spawned
/// opener/invoke subprocesses safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "Email composer bridge", author, version)]
pub struct AppConfig {
    /// Milliseconds between background worker ticks
    #[arg(long = "tick-interval-ms", default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    pub tick_interval_ms: u64,

    /// Command used to hand a mailto URI to the platform
    #[arg(long, default_value = "xdg-open")]
    pub opener_cmd: String,

    /// Invocation target that receives compose requests
    #[arg(long, default_value = DEFAULT_COMPOSER_TARGET)]
    pub composer_target: String,

    /// Payload form handed to the invocation service
    #[arg(long, value_enum, default_value_t = PayloadMode::Mailto)]
    pub payload_mode: PayloadMode,

    /// Command that accepts a JSON invocation descriptor on stdin
    #[arg(long)]
    pub invoke_cmd: Option<String>,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the launcher commands.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            bail!(
                "--tick-interval-ms must be between {MIN_TICK_INTERVAL_MS} and {MAX_TICK_INTERVAL_MS}, got {}",
                self.tick_interval_ms
            );
        }

        self.opener_cmd = sanitize_binary(&self.opener_cmd, "--opener-cmd")?;
        if let Some(cmd) = &self.invoke_cmd {
            self.invoke_cmd = Some(sanitize_binary(cmd, "--invoke-cmd")?);
        }
        if self.payload_mode == PayloadMode::Structured && self.invoke_cmd.is_none() {
            bail!("--payload-mode structured requires --invoke-cmd");
        }

        if self.composer_target.trim().is_empty() {
            bail!("--composer-target cannot be empty");
        }
        if self.composer_target.len() > MAX_TARGET_LEN
            || self
                .composer_target
                .chars()
                .any(|ch| ch.is_whitespace() || ch.is_control())
        {
            bail!(
                "--composer-target must be <={MAX_TARGET_LEN} characters with no whitespace or control characters"
            );
        }

        Ok(())
    }

    /// Worker tick interval as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Allow either a bare command name (resolved from PATH at spawn time) or an
/// existing executable path.
fn sanitize_binary(value: &str, flag: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if trimmed
        .chars()
        .any(|ch| ch.is_whitespace() || ch.is_control())
        || trimmed
            .chars()
            .any(|ch| FORBIDDEN_COMMAND_CHARS.contains(&ch))
    {
        bail!("{flag} must be a single command with no shell metacharacters");
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn accepts_valid_defaults() {
        let mut cfg = AppConfig::parse_from(["test-app"]);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tick_interval(), Duration::from_millis(1_000));
        assert_eq!(cfg.composer_target, "sys.email.composer");
    }

    #[test]
    fn rejects_tick_interval_out_of_bounds() {
        let mut cfg = AppConfig::parse_from(["test-app", "--tick-interval-ms", "5"]);
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::parse_from(["test-app", "--tick-interval-ms", "90000"]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn structured_mode_requires_an_invoke_command() {
        let mut cfg = AppConfig::parse_from(["test-app", "--payload-mode", "structured"]);
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::parse_from([
            "test-app",
            "--payload-mode",
            "structured",
            "--invoke-cmd",
            "invoke-broker",
        ]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_opener_with_shell_metacharacters() {
        for dangerous in [
            "xdg-open;rm -rf /",
            "open|pipe",
            "open & more",
            "open$VAR",
            "quote\"",
            "single'",
            "two words",
        ] {
            let mut cfg = AppConfig::parse_from(["test-app", "--opener-cmd", dangerous]);
            assert!(
                cfg.validate().is_err(),
                "opener '{dangerous}' should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_composer_targets() {
        let mut cfg = AppConfig::parse_from(["test-app", "--composer-target", ""]);
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::parse_from(["test-app", "--composer-target", "has space"]);
        assert!(cfg.validate().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn opener_path_must_be_executable() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let temp_path = env::temp_dir().join(format!("opener_cmd_test_{unique}"));
        fs::write(&temp_path, "#!/bin/sh\nexit 0\n").unwrap();
        let mut perms = fs::metadata(&temp_path).unwrap().permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&temp_path, perms.clone()).unwrap();

        let mut cfg =
            AppConfig::parse_from(["test-app", "--opener-cmd", temp_path.to_str().unwrap()]);
        assert!(
            cfg.validate().is_err(),
            "non-executable opener path should be rejected"
        );

        perms.set_mode(0o700);
        fs::set_permissions(&temp_path, perms).unwrap();
        let mut cfg =
            AppConfig::parse_from(["test-app", "--opener-cmd", temp_path.to_str().unwrap()]);
        assert!(
            cfg.validate().is_ok(),
            "executable opener path should be accepted"
        );

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn bare_command_names_pass_through_unchanged() {
        let mut cfg = AppConfig::parse_from(["test-app", "--opener-cmd", "open"]);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.opener_cmd, "open");
    }
}
