use std::process;
use std::sync::Arc;

use libris::{
    application::{
        authors::AuthorService,
        books::BookService,
        error::AppError,
        repos::{AuthorsRepo, BooksRepo},
    },
    cache::{CacheConfig, TagCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, RoleResolver},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
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
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;
    let state = build_api_state(repositories.clone(), &settings);

    serve_http(&settings, state, repositories).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ApiState {
    let authors_repo: Arc<dyn AuthorsRepo> = repositories.clone();
    let books_repo: Arc<dyn BooksRepo> = repositories;

    // Both services share one cache so each can only invalidate its own
    // collection tag without touching the other's entries.
    let cache = Arc::new(TagCache::new(&CacheConfig::from(&settings.cache)));

    let authors = Arc::new(AuthorService::new(
        authors_repo.clone(),
        books_repo.clone(),
        cache.clone(),
    ));
    let books = Arc::new(BookService::new(books_repo, authors_repo, cache));

    ApiState {
        authors,
        books,
        roles: Arc::new(RoleResolver::new(
            settings.auth.admin_tokens.iter().cloned(),
        )),
    }
}

async fn serve_http(
    settings: &config::Settings,
    state: ApiState,
    repositories: Arc<PostgresRepositories>,
) -> Result<(), AppError> {
    let router = http::build_router(state).merge(http::build_health_router(repositories));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(target = "libris::server", addr = %settings.server.addr, "Listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
