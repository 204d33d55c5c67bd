use std::{
    env::{self},
    error::Error,
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use expense_tracker::{
    AppState, CurrencyFormat, ExpenseStorage, ReportConfig, StorageBackend, build_router,
    graceful_shutdown, logging_middleware,
};

/// The web server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "despesas.db")]
    db_path: PathBuf,

    /// Where to store expenses. Users are always stored in the SQLite database.
    #[arg(long, value_enum, default_value_t = StorageBackend::Sqlite)]
    backend: StorageBackend,

    /// File path to the CSV expense file, used with `--backend csv`.
    #[arg(long, default_value = "despesas.csv")]
    csv_path: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone name used for "today" and report timestamps,
    /// e.g. "America/Sao_Paulo".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// An image to draw at the top of PDF reports.
    #[arg(long)]
    logo_path: Option<PathBuf>,

    /// The symbol placed before amounts of money.
    #[arg(long, default_value = "$")]
    currency_symbol: String,

    /// Use a comma as the decimal separator when displaying amounts.
    #[arg(long)]
    decimal_comma: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging()?;

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET")
        .map_err(|_| "The environment variable 'SECRET' must be set".to_owned())?;

    if let Some(logo_path) = args.logo_path.as_ref().filter(|path| !path.is_file()) {
        tracing::warn!(
            "Logo {} does not exist, PDF reports will use a text title",
            logo_path.display()
        );
    }

    let connection = Connection::open(&args.db_path)?;
    let state = AppState::new(
        connection,
        &secret,
        &args.timezone,
        ExpenseStorage::new(args.backend, args.csv_path),
        ReportConfig {
            logo_path: args.logo_path,
            currency: CurrencyFormat {
                symbol: args.currency_symbol,
                decimal_comma: args.decimal_comma,
            },
        },
    )?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
