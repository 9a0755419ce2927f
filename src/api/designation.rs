use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::designation::Designation;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct DesignationReq {
    #[schema(example = "Senior Engineer")]
    pub title: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/designations",
    request_body = DesignationReq,
    responses(
        (status = 200, description = "Designation created", body = Designation),
        (status = 409, description = "Designation title already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn create_designation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<DesignationReq>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Designation title must not be empty".into()));
    }

    let result = sqlx::query("INSERT INTO designations (title) VALUES (?)")
        .bind(title)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => Ok(HttpResponse::Ok().json(Designation {
            id: res.last_insert_id(),
            title: title.to_string(),
        })),
        Err(e) if ApiError::is_duplicate_key(&e) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Designation title already exists"
        }))),
        Err(e) => Err(ApiError::Database(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/designations",
    responses(
        (status = 200, description = "All designations", body = [Designation]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn list_designations(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let designations =
        sqlx::query_as::<_, Designation>("SELECT id, title FROM designations ORDER BY title")
            .fetch_all(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(designations))
}

#[utoipa::path(
    get,
    path = "/api/v1/designations/{designation_id}",
    params(("designation_id", Path, description = "Designation ID")),
    responses(
        (status = 200, description = "Designation found", body = Designation),
        (status = 404, description = "Designation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn get_designation(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let designation =
        sqlx::query_as::<_, Designation>("SELECT id, title FROM designations WHERE id = ?")
            .bind(path.into_inner())
            .fetch_optional(pool.get_ref())
            .await?
            .ok_or(ApiError::NotFound("Designation"))?;

    Ok(HttpResponse::Ok().json(designation))
}

#[utoipa::path(
    put,
    path = "/api/v1/designations/{designation_id}",
    params(("designation_id", Path, description = "Designation ID")),
    request_body = DesignationReq,
    responses(
        (status = 200, description = "Designation updated"),
        (status = 404, description = "Designation not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn update_designation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DesignationReq>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query("UPDATE designations SET title = ? WHERE id = ?")
        .bind(payload.title.trim())
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Designation"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Designation updated"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/designations/{designation_id}",
    params(("designation_id", Path, description = "Designation ID")),
    responses(
        (status = 200, description = "Designation deleted"),
        (status = 404, description = "Designation not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn delete_designation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query("DELETE FROM designations WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Designation"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Designation deleted"
    })))
}
