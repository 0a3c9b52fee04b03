use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};

use std::{future::Future, sync::Arc};

use crate::{balance, categories, transactions};
use engine::LedgerService;

static USER_UID_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-user-uid");

#[derive(Clone)]
pub struct ServerState {
    pub service: Arc<dyn LedgerService>,
}

/// Caller identity, as asserted by the upstream gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserUid(pub String);

/// `TypedHeader` for the "x-user-uid" header.
///
/// Authentication happens upstream; the value is trusted as is, but must be a
/// non-empty visible string.
#[derive(Debug)]
struct UserUidHeader(String);

impl Header for UserUidHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_UID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(UserUidHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-uid header"),
        }
    }
}

async fn auth(
    user_header: Result<TypedHeader<UserUidHeader>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let TypedHeader(UserUidHeader(user_uid)) =
        user_header.map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(UserUid(user_uid));
    Ok(next.run(request).await)
}

/// Every route requires the `x-user-uid` header.
pub fn router(service: Arc<dyn LedgerService>) -> Router {
    let state = ServerState { service };
    Router::new()
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/period", get(transactions::list_period))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/balance", get(balance::get))
        .route("/categories", get(categories::list))
        .route("/categories/{id}", get(categories::get))
        .route_layer(middleware::from_fn(auth))
        .with_state(state)
}

pub async fn run(
    service: Arc<dyn LedgerService>,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(service, listener, shutdown).await
}

pub async fn run_with_listener(
    service: Arc<dyn LedgerService>,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

pub fn spawn_with_listener(
    service: Arc<dyn LedgerService>,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(service, listener, shutdown).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
