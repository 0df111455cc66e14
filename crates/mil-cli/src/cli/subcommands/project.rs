use clap::Subcommand;

/// Project lifecycle commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create `.milstone/` with an empty database and register the project
    /// with the dashboard.
    Init {
        /// Project key (defaults to the directory name, slugified).
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show the project record and current-period progress.
    Show,
    /// Delete all project data, keeping the project record.
    Reset,
}
