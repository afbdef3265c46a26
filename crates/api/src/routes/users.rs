//! Directory endpoints. All require a bearer token.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use bolao_core::{ApiResponse, CreateUserRequest, PageRequest, PaginatedResponse, UserResponse};

use crate::error::{AppError, AppJson, AppQuery};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Query string for `GET /users`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// Display-name substring filter.
    #[serde(alias = "name")]
    pub nome: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// `POST /user`
pub async fn create_user(
    State(state): State<AppState>,
    RequireAuth(_caller): RequireAuth,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state.user_service().create_user(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User created successfully", user)),
    ))
}

/// `GET /users?nome&page&pageSize`
pub async fn list_users(
    State(state): State<AppState>,
    RequireAuth(_caller): RequireAuth,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<UserResponse>>>, AppError> {
    let page = PageRequest::coerce(query.page, query.page_size);
    let users = state.user_service().list_users(query.nome, page).await?;
    Ok(Json(ApiResponse::ok("Users retrieved successfully", users)))
}

/// `GET /user/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(_caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.user_service().get_user(&id).await?;
    Ok(Json(ApiResponse::ok("User retrieved successfully", user)))
}

/// `DELETE /user/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAuth(_caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.user_service().delete_user(&id).await?;
    Ok(Json(ApiResponse::ok("User deleted successfully", ())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_accepts_both_filter_names() {
        let query: ListUsersQuery =
            serde_json::from_value(serde_json::json!({"nome": "ana", "pageSize": 5})).unwrap();
        assert_eq!(query.nome.as_deref(), Some("ana"));
        assert_eq!(query.page_size, Some(5));

        let query: ListUsersQuery =
            serde_json::from_value(serde_json::json!({"name": "ana"})).unwrap();
        assert_eq!(query.nome.as_deref(), Some("ana"));
        assert_eq!(query.page, None);
    }
}
