use anyhow::Context;
use clap::Parser;
use effort_gate::adapters::pull_request_from_event;
use effort_gate::config::toml_config::TomlConfig;
use effort_gate::core::classifier::Action;
use effort_gate::domain::ports::ConfigProvider;
use effort_gate::utils::logger;
use effort_gate::{Classifier, CliConfig, Command, GateError, GitHubClient, Reaper, Settings};
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<GateError>() {
            Some(gate) => {
                tracing::error!("❌ {} ({})", gate, gate.recovery_suggestion());
                eprintln!("❌ {}", gate.user_friendly_message());
                eprintln!("💡 {}", gate.recovery_suggestion());
                std::process::exit(gate.exit_code());
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let file = match &cli.config {
        Some(path) => Some(TomlConfig::from_file(path)?),
        None => None,
    };
    let settings = Settings::resolve(cli.overrides(), file)?;
    tracing::debug!(
        "Repository {} via {}, grace {}h, dry run: {}",
        settings.repository(),
        settings.api_url(),
        settings.grace_hours(),
        settings.dry_run()
    );

    let github = GitHubClient::from_config(&settings)?;
    let now = chrono::Utc::now();

    match cli.command {
        Command::Classify {
            pr_number,
            event_path,
        } => {
            let classifier = Classifier::new(github, settings.grace_hours())
                .with_dry_run(settings.dry_run());

            let outcome = match (pr_number, event_path) {
                (Some(number), _) => classifier.classify_number(number, now).await?,
                (None, Some(path)) => {
                    let pull_request = read_event(&path)?;
                    classifier.classify(pull_request, now).await?
                }
                (None, None) => {
                    return Err(GateError::MissingConfigError {
                        field: "--pr-number or --event-path".to_string(),
                    }
                    .into())
                }
            };

            for indicator in &outcome.verdict.indicators {
                println!("{}", indicator);
            }
            match outcome.action {
                Action::Justification { deadline, .. } => {
                    println!("⚠️  Justification requested, deadline {}", deadline)
                }
                Action::Suggestions => println!("💡 Suggestions posted"),
                Action::NoAction => println!("✅ No issues found"),
            }
        }
        Command::Reap => {
            let reaper =
                Reaper::new(github, settings.grace_hours()).with_dry_run(settings.dry_run());
            let summary = reaper.sweep(now).await?;

            println!(
                "✅ Examined {} open PR(s), {} flagged, {} closed",
                summary.examined,
                summary.flagged(),
                summary.closed.len()
            );
            for number in &summary.closed {
                println!("🔒 Closed #{}", number);
            }
        }
    }

    Ok(())
}

fn read_event(path: &Path) -> anyhow::Result<effort_gate::domain::model::PullRequest> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("reading event payload {}", path.display()))?;
    Ok(pull_request_from_event(&payload)?)
}
