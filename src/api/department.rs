use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::department::Department;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct DepartmentReq {
    #[schema(example = "Engineering")]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = DepartmentReq,
    responses(
        (status = 200, description = "Department created", body = Department),
        (status = 409, description = "Department name already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<DepartmentReq>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Department name must not be empty".into()));
    }

    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => Ok(HttpResponse::Ok().json(Department {
            id: res.last_insert_id(),
            name: name.to_string(),
        })),
        Err(e) if ApiError::is_duplicate_key(&e) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Department name already exists"
        }))),
        Err(e) => Err(ApiError::Database(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [Department]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let departments =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name")
            .fetch_all(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(departments))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn get_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let department =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
            .bind(path.into_inner())
            .fetch_optional(pool.get_ref())
            .await?
            .ok_or(ApiError::NotFound("Department"))?;

    Ok(HttpResponse::Ok().json(department))
}

#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    request_body = DepartmentReq,
    responses(
        (status = 200, description = "Department updated"),
        (status = 404, description = "Department not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DepartmentReq>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query("UPDATE departments SET name = ? WHERE id = ?")
        .bind(payload.name.trim())
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Department"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(("department_id", Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Department"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted"
    })))
}
