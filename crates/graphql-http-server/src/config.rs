use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde_with::DisplayFromStr;
use size::Size;

pub(crate) const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000);

#[serde_with::serde_as]
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Settings read from `graphql-http.toml`.
pub(crate) struct Config {
    /// Server bind settings
    pub network: NetworkConfig,
    /// GraphQL endpoint settings
    pub graphql: GraphqlConfig,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct NetworkConfig {
    pub listen_address: Option<SocketAddr>,
}

#[serde_with::serde_as]
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GraphqlConfig {
    /// The path the endpoint is mounted on
    pub path: String,
    /// Indent JSON responses
    pub pretty: bool,
    /// Serve the GraphiQL editor to browsers
    pub graphiql: bool,
    /// Maximum size of the request body
    #[serde_as(as = "DisplayFromStr")]
    pub request_body_limit: Size,
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            path: "/graphql".to_string(),
            pretty: false,
            graphiql: true,
            request_body_limit: Size::from_kibibytes(100),
        }
    }
}

impl GraphqlConfig {
    pub fn request_body_limit_bytes(&self) -> usize {
        self.request_body_limit.bytes().max(0) as usize
    }
}
