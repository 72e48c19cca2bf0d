use std::{net::SocketAddr, time::Duration};

use graphql_http::{GraphqlHttp, Options, StandardBodyDecoder};
use graphql_mocks::{tea_shop, MockSchema};
use tokio::signal;

use crate::config::GraphqlConfig;

pub(crate) fn router(config: &GraphqlConfig) -> axum::Router {
    let options = Options::<MockSchema>::new(tea_shop::schema())
        .with_pretty(config.pretty)
        .with_graphiql(config.graphiql);

    GraphqlHttp::builder(options)
        .body_decoder(StandardBodyDecoder::new(config.request_body_limit_bytes()))
        .build()
        .router(&config.path)
}

pub(crate) async fn serve(addr: SocketAddr, config: &GraphqlConfig) -> anyhow::Result<()> {
    let app = router(config).into_make_service();

    let handle = axum_server::Handle::new();

    // Spawn a task to gracefully shutdown server.
    tokio::spawn(graceful_shutdown(handle.clone()));

    let handle_for_listening = handle.clone();
    let url = format!("http://{addr}{}", config.path);
    tokio::spawn(async move {
        if handle_for_listening.listening().await.is_some() {
            tracing::info!("GraphQL endpoint exposed at {url}");
        }
    });

    axum_server::bind(addr).handle(handle).serve(app).await?;

    Ok(())
}

async fn graceful_shutdown(handle: axum_server::Handle) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
    handle.graceful_shutdown(Some(Duration::from_secs(3)));
}
