use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{UserUid, router, run, run_with_listener, spawn_with_listener};

mod balance;
mod categories;
mod server;
mod transactions;
mod views;

pub mod types {
    pub mod transaction {
        pub use api_types::transaction::{
            TransactionList, TransactionListResponse, TransactionNew, TransactionPeriodList,
            TransactionUpdate, TransactionView,
        };
    }

    pub mod category {
        pub use api_types::category::{CategoriesResponse, CategoryList, CategoryView};
    }

    pub mod balance {
        pub use api_types::balance::BalanceView;
    }
}

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::OwnershipMismatch(_) => StatusCode::FORBIDDEN,
        EngineError::Notification(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        EngineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Persistence(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError::Engine(err) = self;
        let status = status_for_engine_error(&err);
        let error = message_for_engine_error(err);

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
