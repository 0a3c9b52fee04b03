use api_types::balance::BalanceView;
use axum::{Extension, Json, extract::State};

use crate::{ServerError, UserUid, server::ServerState, views::map_balance};

pub async fn get(
    Extension(UserUid(user_uid)): Extension<UserUid>,
    State(state): State<ServerState>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance = state.service.user_balance(&user_uid).await?;
    Ok(Json(map_balance(balance)))
}
