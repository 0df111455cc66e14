use clap::Subcommand;

/// Decision record, override, and link commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DecisionCommands {
    /// Record a decision.
    Create {
        #[arg(long)]
        title: String,
        /// The decision text itself.
        #[arg(long)]
        decision: String,
        /// Minimum authority level (1-4) needed to override this decision.
        #[arg(long)]
        level: i64,
        /// Principal making the decision; their current level is snapshotted.
        #[arg(long)]
        maker: String,
        /// proposed, accepted, rejected, deprecated, superseded
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        alternatives: Option<String>,
        #[arg(long)]
        consequences: Option<String>,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
        /// Link to a milestone at creation time.
        #[arg(long)]
        milestone: Option<String>,
        /// made_for, affects, implements, blocked_by
        #[arg(long)]
        relation: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Get full decision detail, including both sides of the override graph.
    Get { id: i64 },
    /// List decisions in creation order.
    List {
        /// Comma-separated status set.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        level: Option<i64>,
        #[arg(long)]
        maker: Option<String>,
        #[arg(long)]
        milestone: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Created on or after this date (RFC 3339 or YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Created on or before this date.
        #[arg(long)]
        to: Option<String>,
    },
    /// List decisions currently in force.
    Active,
    /// Record that a decision overrides one or more others.
    Override {
        id: i64,
        /// Target decision ids, comma-separated.
        #[arg(long, value_delimiter = ',', required = true)]
        overrides: Vec<i64>,
    },
    /// File an override request against a decision.
    Request {
        id: i64,
        #[arg(long)]
        requester: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        summary: Option<String>,
    },
    /// Approve or reject a pending override request.
    Resolve {
        request_id: i64,
        #[arg(long)]
        reviewer: String,
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },
    /// Link a decision to a milestone.
    Link {
        id: i64,
        #[arg(long)]
        milestone: String,
        #[arg(long)]
        relation: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Change a decision's lifecycle status.
    Status {
        id: i64,
        /// proposed, accepted, rejected, deprecated, superseded
        status: String,
    },
}
