use clap::Subcommand;

/// Milestone progress-log commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LogCommands {
    /// Append a progress note to a milestone.
    Add {
        slug: String,
        #[arg(long)]
        summary: String,
        /// Defaults to `[general] default_author` from config.
        #[arg(long)]
        author: Option<String>,
        /// Also set the milestone status (active or done).
        #[arg(long)]
        status: Option<String>,
        /// Progress percentage 0-100.
        #[arg(long)]
        progress: Option<i64>,
    },
    /// List a milestone's logs in sequence order.
    List { slug: String },
    /// Edit a log entry by milestone slug and sequence number.
    Edit {
        slug: String,
        sequence: i64,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        progress: Option<i64>,
    },
}
