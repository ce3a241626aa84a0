use std::{future::IntoFuture, process, sync::Arc};

use todos::{
    application::{error::AppError, repos::TodosRepo, todos::TodoService},
    cache, config,
    infra::{
        db::MongoRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::{sync::oneshot, task::JoinError};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    // A missing .env is the normal case outside local development.
    dotenv::dotenv().ok();

    let settings = config::load_with_cli()
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let store = init_store(&settings.store).await?;
    let todo_cache = cache::connect(&settings.cache)
        .await
        .map_err(AppError::from)?;

    let service = TodoService::new(store, todo_cache);
    serve_http(&settings.server, HttpState::new(service)).await
}

async fn init_store(settings: &config::StoreSettings) -> Result<Arc<dyn TodosRepo>, AppError> {
    let repositories = MongoRepositories::connect(settings)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    repositories
        .ensure_indexes()
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    info!(
        target = "todos::store",
        database = %settings.database,
        collection = %settings.collection,
        "Connected to MongoDB"
    );

    Ok(Arc::new(repositories))
}

async fn serve_http(settings: &config::ServerSettings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let advertised = settings
        .advertised_port
        .clone()
        .unwrap_or_else(|| settings.addr.port().to_string());
    info!(
        target = "todos::http",
        addr = %settings.addr,
        "Listening & Serving on :{advertised}"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let mut server = tokio::spawn(
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = signalled_tx.send(());
            })
            .into_future(),
    );

    // The sender is dropped without firing when the server stops on its own.
    if signalled_rx.await.is_err() {
        return settle(server.await);
    }

    info!(
        target = "todos::http",
        grace_secs = settings.graceful_shutdown.as_secs(),
        "Shutting down"
    );

    match tokio::time::timeout(settings.graceful_shutdown, &mut server).await {
        Ok(joined) => settle(joined),
        Err(_) => {
            warn!(
                target = "todos::http",
                "graceful shutdown timed out; dropping open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn settle(joined: Result<std::io::Result<()>, JoinError>) -> Result<(), AppError> {
    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "todos::http", error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(target = "todos::http", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
