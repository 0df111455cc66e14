use clap::Subcommand;

/// Progress stats and snapshot commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProgressCommands {
    /// Show progress totals for the current period.
    Show,
    /// Freeze the current period into a snapshot and start a new one.
    Reset {
        #[arg(long)]
        label: Option<String>,
    },
    /// List all snapshots, newest first.
    History,
}
