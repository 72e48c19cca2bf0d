use std::fmt;

use clap::ValueEnum;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Default)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors from the server and the GraphQL handler
    Error,
    /// Warnings and errors, including every rejected request
    Warn,
    /// Info, warning and error messages
    #[default]
    Info,
    /// Debug, info, warning and error messages, including request spans
    Debug,
    /// Trace, debug, info, warning and error messages from all dependencies
    Trace,
}

impl LogLevel {
    pub(crate) fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "graphql_http=error,graphql_http_server=error,off",
            LogLevel::Warn => "graphql_http=warn,graphql_http_server=warn,off",
            LogLevel::Info => "graphql_http=info,graphql_http_server=info,off",
            LogLevel::Debug => "graphql_http=debug,graphql_http_server=debug,graphql_mocks=debug,off",
            LogLevel::Trace => "trace",
        }
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(super) enum LogStyle {
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
