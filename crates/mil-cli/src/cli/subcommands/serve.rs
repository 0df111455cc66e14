use clap::Args;

/// Arguments for `milstone serve`.
#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Bind host (defaults to `[server] host` from config).
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (defaults to `[server] port` from config).
    #[arg(long)]
    pub port: Option<u16>,
}
