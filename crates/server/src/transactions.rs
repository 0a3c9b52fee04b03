//! Transactions API endpoints

use api_types::transaction::{
    TransactionList, TransactionListResponse, TransactionNew, TransactionPeriodList,
    TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateTransactionCmd, EngineError, TransactionPage, UpdateTransactionCmd};

use crate::{
    ServerError, UserUid,
    server::ServerState,
    views::{engine_kind, map_transaction, parse_amount},
};

fn list_response(page: TransactionPage) -> TransactionListResponse {
    TransactionListResponse {
        transactions: page.transactions.into_iter().map(map_transaction).collect(),
        total: page.total,
    }
}

pub async fn create(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let cmd = CreateTransactionCmd::new(
        user_uid,
        payload.category_id,
        engine_kind(payload.kind),
        amount,
        payload.transaction_date,
    )
    .title(payload.title)
    .description(payload.description);

    let tx = state.service.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

pub async fn list(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let page = state
        .service
        .list_user_transactions(
            &user_uid,
            query.limit.unwrap_or_default(),
            query.offset.unwrap_or_default(),
        )
        .await?;
    Ok(Json(list_response(page)))
}

pub async fn list_period(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionPeriodList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let page = state
        .service
        .list_user_transactions_in_period(
            &user_uid,
            query.days,
            query.limit.unwrap_or_default(),
            query.offset.unwrap_or_default(),
        )
        .await?;
    Ok(Json(list_response(page)))
}

/// Transactions of other users are reported as missing.
pub async fn get(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.service.transaction(id).await?;
    if tx.user_uid != user_uid {
        return Err(EngineError::NotFound(format!("transaction {id}")).into());
    }
    Ok(Json(map_transaction(tx)))
}

pub async fn update(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let cmd = UpdateTransactionCmd::new(
        id,
        user_uid,
        payload.category_id,
        engine_kind(payload.kind),
        amount,
        payload.transaction_date,
    )
    .title(payload.title)
    .description(payload.description);

    let tx = state.service.update_transaction(cmd).await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn delete(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.service.delete_transaction(id, &user_uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
