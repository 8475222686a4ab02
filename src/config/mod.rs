pub mod grace;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_repository_slug, validate_required_field, validate_url,
    Validate,
};
use grace::GraceHours;
use toml_config::TomlConfig;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Values supplied on the command line or through the environment.
/// Anything left `None` falls back to the TOML file, then to defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repository: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub grace_hours: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub repository: String,
    pub api_url: String,
    pub token: String,
    pub grace_hours: GraceHours,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(overrides: Overrides, file: Option<TomlConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let repository = overrides.repository.or(file.github.repository);
        let token = overrides.token.or(file.github.token);
        let api_url = overrides
            .api_url
            .or(file.github.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let grace_raw = overrides
            .grace_hours
            .or_else(|| file.policy.grace_hours_raw());

        let settings = Self {
            repository: validate_required_field("repository", &repository)?.clone(),
            token: validate_required_field("token", &token)?.clone(),
            api_url: api_url.trim_end_matches('/').to_string(),
            grace_hours: GraceHours::parse(grace_raw.as_deref()),
            dry_run: overrides.dry_run || file.policy.dry_run.unwrap_or(false),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_repository_slug("repository", &self.repository)?;
        validate_url("api_url", &self.api_url)?;
        validate_non_empty_string("token", &self.token)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn repository(&self) -> &str {
        &self.repository
    }

    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn token(&self) -> &str {
        &self.token
    }

    fn grace_hours(&self) -> GraceHours {
        self.grace_hours
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(feature = "cli")]
pub mod cli {
    use super::Overrides;
    use clap::{Parser, Subcommand};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "effort-gate")]
    #[command(about = "Flags low-effort pull requests and closes the ones left unjustified")]
    pub struct CliConfig {
        /// Repository to operate on, as owner/name
        #[arg(long, env = "GITHUB_REPOSITORY", global = true)]
        pub repository: Option<String>,

        /// GitHub REST API base URL
        #[arg(long, env = "GITHUB_API_URL", global = true)]
        pub api_url: Option<String>,

        /// Token with pull-request and issue write access
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
        pub token: Option<String>,

        /// Hours a contributor has to justify a flagged PR
        #[arg(long, env = "LOW_EFFORT_GRACE_HOURS", global = true)]
        pub grace_hours: Option<String>,

        /// Optional TOML settings file
        #[arg(short, long, global = true)]
        pub config: Option<PathBuf>,

        /// Log intended actions without changing anything on GitHub
        #[arg(long, global = true)]
        pub dry_run: bool,

        /// Enable verbose output
        #[arg(short, long, global = true)]
        pub verbose: bool,

        /// Emit logs as JSON lines
        #[arg(long, global = true)]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Evaluate one pull request and label/comment on it
        Classify {
            /// Pull request number to fetch
            #[arg(long, env = "PR_NUMBER")]
            pr_number: Option<u64>,

            /// Webhook event payload containing a pull_request object; ignored when --pr-number is set
            #[arg(long, env = "GITHUB_EVENT_PATH")]
            event_path: Option<PathBuf>,
        },
        /// Close flagged pull requests whose grace period ran out
        Reap,
    }

    impl CliConfig {
        pub fn overrides(&self) -> Overrides {
            Overrides {
                repository: self.repository.clone(),
                api_url: self.api_url.clone(),
                token: self.token.clone(),
                grace_hours: self.grace_hours.clone(),
                dry_run: self.dry_run,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GateError;

    fn overrides() -> Overrides {
        Overrides {
            repository: Some("octo/widgets".to_string()),
            token: Some("t0ken".to_string()),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(overrides(), None).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.grace_hours.hours(), 48.0);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[github]
repository = "file/repo"
api_url = "http://localhost:9999/"

[policy]
grace_hours = 24
dry_run = true
"#,
        )
        .unwrap();

        let mut cli = overrides();
        cli.grace_hours = Some("6".to_string());

        let settings = Settings::resolve(cli, Some(file)).unwrap();
        assert_eq!(settings.repository, "octo/widgets");
        assert_eq!(settings.api_url, "http://localhost:9999");
        assert_eq!(settings.grace_hours.hours(), 6.0);
        assert!(settings.dry_run);
    }

    #[test]
    fn test_invalid_grace_hours_never_fail_resolution() {
        let mut cli = overrides();
        cli.grace_hours = Some("-5".to_string());
        let settings = Settings::resolve(cli, None).unwrap();
        assert_eq!(settings.grace_hours(), GraceHours::default());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_grace_hours_env_variable() {
        use clap::CommandFactory;

        let command = cli::CliConfig::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "grace_hours")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("LOW_EFFORT_GRACE_HOURS")));
    }

    #[test]
    fn test_missing_token_is_reported() {
        let mut cli = overrides();
        cli.token = None;
        let err = Settings::resolve(cli, None).unwrap_err();
        assert!(matches!(err, GateError::MissingConfigError { ref field } if field == "token"));
    }

    #[test]
    fn test_bad_repository_slug_is_rejected() {
        let mut cli = overrides();
        cli.repository = Some("widgets".to_string());
        assert!(Settings::resolve(cli, None).is_err());
    }
}
