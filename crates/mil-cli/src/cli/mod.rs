use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `milstone` binary.
#[derive(Debug, Parser)]
#[command(name = "milstone", version, about = "Milstone - local milestone and decision tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .milstone)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::subcommands::{DecisionCommands, MilestoneCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "milstone",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "progress",
            "show",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["milstone", "progress", "show", "--format", "json", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["milstone", "--format", "xml", "progress", "show"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn milestone_create_parses_options() {
        let cli = Cli::try_parse_from([
            "milstone",
            "milestone",
            "create",
            "--title",
            "Ship v1",
            "--priority",
            "5",
            "--due",
            "2026-09-30",
        ])
        .expect("cli should parse");

        let Commands::Milestone { action } = cli.command else {
            panic!("expected milestone command");
        };
        let MilestoneCommands::Create { title, priority, due, .. } = action else {
            panic!("expected create");
        };
        assert_eq!(title, "Ship v1");
        assert_eq!(priority, Some(5));
        assert_eq!(due.as_deref(), Some("2026-09-30"));
    }

    #[test]
    fn decision_override_parses_comma_separated_targets() {
        let cli = Cli::try_parse_from([
            "milstone",
            "decision",
            "override",
            "7",
            "--overrides",
            "1,2,3",
        ])
        .expect("cli should parse");

        let Commands::Decision { action } = cli.command else {
            panic!("expected decision command");
        };
        let DecisionCommands::Override { id, overrides } = action else {
            panic!("expected override");
        };
        assert_eq!(id, 7);
        assert_eq!(overrides, vec![1, 2, 3]);
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["milstone", "--project", "/tmp/demo", "progress", "show"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }
}
