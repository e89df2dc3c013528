use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Command line flags, falling back to `TAK_*` environment variables
/// (which a `.env` file may supply).
#[derive(Parser, Debug, Clone)]
#[command(name = "tak-api")]
#[command(about = "HTTP service adjudicating Tak games", long_about = None)]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "TAK_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// SQLite database file (`:memory:` for a throwaway store)
    #[arg(long, env = "TAK_DB_FILE", default_value = "tak.db")]
    pub db_file: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, env = "TAK_DEBUG")]
    pub debug: bool,
}

impl Config {
    /// Default log directive when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
