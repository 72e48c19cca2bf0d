use std::{fs, io::ErrorKind, net::SocketAddr, path::PathBuf};

use anyhow::anyhow;
use clap::Parser;
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::config::Config;

mod log;

pub(crate) use log::LogLevel;

use self::log::LogStyle;

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Parser)]
#[command(name = "graphql-http-server", version)]
/// Serves the tea shop schema over GraphQL HTTP
pub(crate) struct Args {
    /// IP address on which the server will listen for incoming connections. Defaults to 127.0.0.1:4000.
    #[arg(short, long, env = "GRAPHQL_HTTP_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "GRAPHQL_HTTP_CONFIG_PATH", default_value = "./graphql-http.toml")]
    pub config: PathBuf,
    /// Set the logging level
    #[arg(long = "log", env = "GRAPHQL_HTTP_LOG")]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "GRAPHQL_HTTP_LOG_STYLE", default_value_t = LogStyle::Text)]
    log_style: LogStyle,
}

impl Args {
    /// Loads the configuration file. A missing file at the default location means default settings.
    pub fn config(&self) -> anyhow::Result<Config> {
        let content = match fs::read_to_string(&self.config) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(error) => return Err(anyhow!("error loading config file {}:\n{error}", self.config.display())),
        };

        toml::from_str(&content).map_err(|e| anyhow!("error parsing config file {}:\n{e}", self.config.display()))
    }

    /// The command line address takes precedence over the configuration.
    pub fn listen_address(&self, config: &Config) -> SocketAddr {
        self.listen_address
            .or(config.network.listen_address)
            .unwrap_or(crate::config::DEFAULT_LISTEN_ADDRESS)
    }

    pub fn log_filter(&self) -> &'static str {
        self.log_level.unwrap_or_default().as_filter_str()
    }

    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer();

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if atty::is(atty::Stream::Stdout) => layer.with_ansi(true).boxed(),
            // for server logs, colors are off
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}

pub(crate) fn parse() -> Args {
    Args::parse()
}
