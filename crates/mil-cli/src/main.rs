use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("milstone error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    load_dotenv(flags.project.as_deref());

    // Init and serve run before project-root resolution: init creates the
    // root, serve works across all registered projects.
    match &cli.command {
        cli::Commands::Project {
            action: cli::subcommands::ProjectCommands::Init { key, name, description },
        } => {
            let root = init_target_root(flags.project.as_deref())?;
            let config = mil_config::MilConfig::load(Some(&root))?;
            return commands::project::init(
                &root,
                key.as_deref(),
                name.as_deref(),
                description.as_deref(),
                &config,
                &flags,
            )
            .await;
        }
        cli::Commands::Serve(args) => {
            let root = find_any_project_root(flags.project.as_deref());
            let config = mil_config::MilConfig::load(root.as_deref())?;
            return commands::serve::handle(args, &config).await;
        }
        _ => {}
    }

    let project_root = resolve_project_root(flags.project.as_deref())?;
    let config = mil_config::MilConfig::load(Some(&project_root))?;

    let ctx = context::AppContext::init(project_root, config)
        .await
        .context("failed to open project database")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MILSTONE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_dotenv(project_override: Option<&str>) {
    if let Some(project) = project_override {
        let env_path = PathBuf::from(project).join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path).ok();
            return;
        }
    }
    dotenvy::dotenv().ok();
}

/// Directory where `project init` creates `.milstone/`.
fn init_target_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    match project_override {
        Some(path) => {
            let root = PathBuf::from(path);
            if !root.is_dir() {
                anyhow::bail!("invalid --project '{}': directory does not exist", root.display());
            }
            Ok(root)
        }
        None => std::env::current_dir().context("failed to read current directory"),
    }
}

fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);

        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == ".milstone")
        {
            return explicit
                .parent()
                .map(std::path::Path::to_path_buf)
                .context("invalid --project path: '.milstone' directory has no parent");
        }

        if explicit.is_dir() {
            return Ok(explicit);
        }

        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    context::find_project_root(&start)
        .context("not a milstone project (no .milstone directory found). Run 'milstone project init' first.")
}

/// Best-effort root detection for commands that work without one.
fn find_any_project_root(project_override: Option<&str>) -> Option<PathBuf> {
    resolve_project_root(project_override).ok()
}
