use clap::Subcommand;

/// Override-request listing commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RequestCommands {
    /// List override requests, newest first.
    List {
        /// pending, approved, rejected
        #[arg(long)]
        status: Option<String>,
        /// Only requests against this decision.
        #[arg(long)]
        decision: Option<i64>,
    },
}
