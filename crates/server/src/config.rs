//! Server settings from flags and environment.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Serve the deck generator over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "deckgen-server")]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "DECKGEN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "DECKGEN_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Brand config JSON (default: built-in brand, assets under ./brand-assets)
    #[arg(short, long, env = "DECKGEN_BRAND_CONFIG")]
    pub brand_config: Option<PathBuf>,

    /// Directory generated decks are written to and served from
    #[arg(short, long, env = "DECKGEN_OUTPUT_DIR", default_value = "generated")]
    pub output_dir: PathBuf,

    /// Seconds before idle conversations and job records are dropped
    #[arg(long, env = "DECKGEN_SESSION_TTL_SECS", default_value_t = 3600)]
    pub session_ttl_secs: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// How often the expiry task runs: at most every minute, at least every
    /// second.
    pub fn sweep_interval(&self) -> Duration {
        self.session_ttl()
            .min(Duration::from_secs(60))
            .max(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["deckgen-server"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.output_dir, PathBuf::from("generated"));
        assert_eq!(config.session_ttl(), Duration::from_secs(3600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert!(config.brand_config.is_none());
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "deckgen-server",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "--session-ttl-secs",
            "0",
        ])
        .unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }
}
