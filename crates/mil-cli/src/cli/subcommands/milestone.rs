use clap::Subcommand;

/// Milestone entity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MilestoneCommands {
    /// Create a milestone.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// active or done (planned is accepted as an alias for active)
        #[arg(long)]
        status: Option<String>,
        /// Priority 1-5, higher sorts first (default 3).
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long = "start")]
        start_date: Option<String>,
        #[arg(long = "due")]
        due: Option<String>,
        /// Slug of the parent milestone.
        #[arg(long)]
        parent: Option<String>,
        /// Estimated effort in hours (default 1).
        #[arg(long = "hours")]
        expected_hours: Option<f64>,
    },
    /// Update a milestone by slug.
    Update {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long = "start")]
        start_date: Option<String>,
        #[arg(long = "due")]
        due: Option<String>,
        #[arg(long)]
        parent: Option<String>,
        /// Detach from the current parent.
        #[arg(long, conflicts_with = "parent")]
        clear_parent: bool,
        #[arg(long = "hours")]
        expected_hours: Option<f64>,
    },
    /// List milestones for the current period.
    List {
        /// Include soft-deleted milestones.
        #[arg(long)]
        all: bool,
    },
    /// Soft-delete a milestone by slug.
    Delete { slug: String },
}
