//! Categories API endpoints.

use api_types::category::{CategoriesResponse, CategoryList, CategoryView};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    ServerError,
    server::ServerState,
    views::{engine_kind, map_category},
};

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CategoryList>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let categories = match query.kind {
        Some(kind) => state.service.categories_by_kind(engine_kind(kind)).await?,
        None => state.service.categories().await?,
    };

    Ok(Json(CategoriesResponse {
        categories: categories.into_iter().map(map_category).collect(),
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.service.category(id).await?;
    Ok(Json(map_category(category)))
}
