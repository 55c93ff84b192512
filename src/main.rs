mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use cli::{Cli, Commands, output::Output};
use patlaw::{
    AppState, ConfigManager, PatlawConfig, ToolRegistry, build_app, db::DatabaseProvider,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let result = cli::init::run(
                cli::init::InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                &output,
            );
            if let cli::init::InitResult::Error(e) = result {
                bail!("init failed: {}", e);
            }
            Ok(())
        }
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::Tool { name, params }) => {
            run_tool(&cli.config, cli.verbose, &name, &params).await
        }
        Some(Commands::Serve) | None => serve(&cli.config, cli.verbose, &output).await,
    }
}

fn init_tracing(level: &str, format: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "patlaw={lvl},patlaw_server={lvl},tower_http={lvl}",
            lvl = default_level
        ))
    });

    let json = format == "json";
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .init();
}

async fn serve(config_path: &Path, verbose: bool, output: &Output) -> anyhow::Result<()> {
    let config_manager = Arc::new(
        ConfigManager::new(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?,
    );
    let config = config_manager.config();

    init_tracing(&config.server.log_level, &config.server.log_format, verbose);
    output.banner();

    if let Err(e) = config_manager.start_watching() {
        tracing::warn!("Config hot reload unavailable: {}", e);
    }

    let db = DatabaseProvider::from_config(&config.database)
        .create_client()
        .await
        .context("opening the database")?;
    let tool_registry = Arc::new(ToolRegistry::from_config(&config).context("building tools")?);

    let state = AppState {
        config_manager,
        db,
        tool_registry,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("patlaw listening on http://{}", addr);
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("patlaw stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn run_tool(config_path: &Path, verbose: bool, name: &str, params: &str) -> anyhow::Result<()> {
    let config = PatlawConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    init_tracing(&config.server.log_level, &config.server.log_format, verbose);

    let params: serde_json::Value =
        serde_json::from_str(params).context("tool parameters must be a JSON object")?;
    let registry = ToolRegistry::from_config(&config).context("building tools")?;

    let documents = registry.call(name, params).await?;
    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}

fn show_config(config_path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    // Parsed without the env checks so the file can be inspected before secrets exist
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let config: PatlawConfig = toml::from_str(&content)
        .with_context(|| format!("parsing {}", config_path.display()))?;

    output.header("Configuration");
    output.kv("file", &config_path.display().to_string());
    output.kv(
        "listen",
        &format!("{}:{}", config.server.host, config.server.port),
    );
    output.kv("database", &config.database.url);
    output.kv("chat model", &config.chat.model);
    output.kv("search", &config.search.url);

    output.header("Tools");
    for tool in config.enabled_tools() {
        output.list_item(tool);
    }

    if validate {
        output.newline();
        match config.validate() {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                bail!("invalid configuration");
            }
        }
    }

    Ok(())
}
