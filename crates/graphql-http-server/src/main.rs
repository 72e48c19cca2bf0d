#![cfg_attr(test, allow(unused_crate_dependencies))]

use clap::crate_version;
use tokio::runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod config;
mod server;

const THREAD_NAME: &str = "graphql-http-server";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    let config = args.config()?;

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()?;

    runtime.block_on(async move {
        let filter = EnvFilter::try_from_env("GRAPHQL_HTTP_RUST_LOG").unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

        tracing_subscriber::registry()
            .with(args.log_format())
            .with(filter)
            .try_init()?;

        let crate_version = crate_version!();
        tracing::info!("GraphQL HTTP server {crate_version}");

        let listen_address = args.listen_address(&config);
        server::serve(listen_address, &config.graphql).await?;

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
