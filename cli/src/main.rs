use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fleet_core::{BusFilter, ClientConfig, FleetApi, FleetDirectory, PageQuery};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "fleet")]
#[command(about = "Browse the bus fleet", long_about = None)]
struct Cli {
    /// TOML file with base_url, timeout_ms and page_size.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured base URL.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List one page of buses
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Buses per page (defaults to the configured page size)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        size: Option<u32>,

        /// all, active or inactive
        #[arg(short, long, default_value = "all")]
        filter: BusFilter,
    },
    /// Show a single bus
    Show { id: i64 },
    /// Active/inactive/total counts for the whole fleet
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let output = run(cli.command, &config).await?;
    print!("{output}");
    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    resolve_config_with(cli, |key| std::env::var(key).ok())
}

/// File, then environment (through `lookup`), then flags.
fn resolve_config_with<F>(cli: &Cli, lookup: F) -> anyhow::Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config =
        ClientConfig::load_with(cli.config.as_deref(), lookup).context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate().context("invalid configuration")?;
    tracing::debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "Configuration resolved");
    Ok(config)
}

async fn run(command: Commands, config: &ClientConfig) -> anyhow::Result<String> {
    let api = FleetApi::connect(config);
    match command {
        Commands::List { page, size, filter } => {
            let directory = FleetDirectory::new(api, config.page_size);
            directory.set_filter(filter);
            directory
                .load(PageQuery::new(page - 1, size.unwrap_or(config.page_size)))
                .await;

            let state = directory.snapshot();
            if let Some(err) = state.error() {
                anyhow::bail!(render::render_error(err));
            }
            match state.view() {
                Some(view) => Ok(render::render_page(view, state.filter())),
                None => anyhow::bail!("no page was loaded"),
            }
        }
        Commands::Show { id } => match api.get_bus(id).await {
            Ok(bus) => Ok(render::render_bus(&bus)),
            Err(err) => anyhow::bail!(render::render_error(&err)),
        },
        Commands::Stats => {
            let directory = FleetDirectory::new(api, config.page_size);
            match directory.fleet_stats().await {
                Ok(stats) => Ok(render::render_stats(&stats)),
                Err(err) => anyhow::bail!(render::render_error(&err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    async fn backend() -> ClientConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(mock_server::run(listener));
        ClientConfig::with_base_url(&format!("http://{addr}"))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_arguments_parse() {
        let cli = Cli::try_parse_from(["fleet", "list", "--page", "3", "--filter", "inactive"]).unwrap();
        match cli.command {
            Commands::List { page, size, filter } => {
                assert_eq!(page, 3);
                assert_eq!(size, None);
                assert_eq!(filter, BusFilter::Inactive);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(Cli::try_parse_from(["fleet", "list", "--page", "0"]).is_err());
        assert!(Cli::try_parse_from(["fleet", "list", "--filter", "broken"]).is_err());
    }

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::try_parse_from([
            "fleet",
            "--base-url",
            "http://fleet.internal:9000",
            "--timeout-ms",
            "1500",
            "stats",
        ])
        .unwrap();
        let env = |key: &str| match key {
            "FLEET_API_BASE_URL" => Some("http://from-env:1".to_string()),
            "FLEET_API_TIMEOUT_MS" => Some("not a number".to_string()),
            _ => None,
        };
        // A malformed environment value still fails before flags apply.
        assert!(resolve_config_with(&cli, env).is_err());

        let env = |key: &str| match key {
            "FLEET_API_BASE_URL" => Some("http://from-env:1".to_string()),
            "FLEET_API_TIMEOUT_MS" => Some("250".to_string()),
            _ => None,
        };
        let config = resolve_config_with(&cli, env).unwrap();
        assert_eq!(config.base_url, "http://fleet.internal:9000");
        assert_eq!(config.timeout_ms, 1500);
    }

    #[test]
    fn environment_applies_when_no_flag_is_given() {
        let cli = Cli::try_parse_from(["fleet", "stats"]).unwrap();
        let config = resolve_config_with(&cli, |key| {
            (key == "FLEET_API_TIMEOUT_MS").then(|| "2500".to_string())
        })
        .unwrap();
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.page_size, 5);
    }

    #[tokio::test]
    async fn list_renders_requested_page() {
        let config = backend().await;
        let command = Commands::List {
            page: 2,
            size: Some(5),
            filter: BusFilter::All,
        };
        let out = run(command, &config).await.unwrap();
        assert!(out.starts_with("23 buses in the fleet"));
        assert!(out.contains("Showing 6–10 of 23"));
        assert!(out.contains("[2]"));
    }

    #[tokio::test]
    async fn show_missing_bus_fails_with_status() {
        let config = backend().await;
        let err = run(Commands::Show { id: 404 }, &config).await.unwrap_err();
        assert!(err.to_string().starts_with("Not found."));
    }

    #[tokio::test]
    async fn stats_count_the_fleet() {
        let config = backend().await;
        let out = run(Commands::Stats, &config).await.unwrap();
        assert_eq!(out, "Total: 23\nActive: 18\nInactive: 5\n");
    }
}
