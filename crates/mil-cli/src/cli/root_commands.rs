use clap::Subcommand;

use super::subcommands::{
    DecisionCommands, LogCommands, MilestoneCommands, ProgressCommands, ProjectCommands,
    RequestCommands, ServeArgs,
};

/// All top-level subcommands of the `milstone` binary.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Project lifecycle (init, show, reset).
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Milestone CRUD.
    Milestone {
        #[command(subcommand)]
        action: MilestoneCommands,
    },
    /// Progress logs on a milestone.
    Log {
        #[command(subcommand)]
        action: LogCommands,
    },
    /// Progress stats and snapshots.
    Progress {
        #[command(subcommand)]
        action: ProgressCommands,
    },
    /// Decision records, overrides, and links.
    Decision {
        #[command(subcommand)]
        action: DecisionCommands,
    },
    /// Override requests.
    Requests {
        #[command(subcommand)]
        action: RequestCommands,
    },
    /// Run the dashboard HTTP service in the foreground.
    Serve(ServeArgs),
}
