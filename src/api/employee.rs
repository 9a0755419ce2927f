use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-3000", value_type = String)]
    pub employee_code: String,
    #[schema(example = "John", value_type = String)]
    pub first_name: String,
    #[schema(example = "Doe", value_type = String)]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "+8801712345678")]
    pub phone: Option<String>,
    #[schema(example = 1)]
    pub department_id: Option<u64>,
    #[schema(example = 2)]
    pub designation_id: Option<u64>,
    #[schema(example = 7)]
    pub manager_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub designation_id: Option<u64>,
    /// Filter by employment status; terminated records are included unless
    /// the caller filters them out.
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 5)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

const EMPLOYEE_COLUMNS: &str = r#"
    id, employee_code, first_name, last_name, email, phone,
    department_id, designation_id, manager_id, hire_date, leave_date, status,
    leave_balance_annual, leave_balance_sick, leave_balance_personal,
    leave_balance_maternity, leave_balance_paternity
"#;

// Columns the PATCH endpoint may touch. Balances are deliberately absent:
// they are mutated only by leave approval.
const UPDATABLE_COLUMNS: &[&str] = &[
    "employee_code",
    "first_name",
    "last_name",
    "email",
    "phone",
    "department_id",
    "designation_id",
    "manager_id",
    "hire_date",
    "leave_date",
    "status",
];

async fn fetch_by_email(pool: &MySqlPool, email: &str) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {} FROM employees WHERE email = ?", EMPLOYEE_COLUMNS);
    sqlx::query_as::<_, Employee>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Create Employee. A duplicate email belonging to a terminated record is a
/// re-hire: the old record is reactivated in place so history stays attached.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created or reactivated", body = Employee),
        (status = 409, description = "Email or employee code already in use"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, first_name, last_name, email, phone, department_id, designation_id, manager_id, hire_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.department_id)
    .bind(payload.designation_id)
    .bind(payload.manager_id)
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
            let employee = sqlx::query_as::<_, Employee>(&sql)
                .bind(res.last_insert_id())
                .fetch_one(pool.get_ref())
                .await?;

            info!(employee_id = employee.id, "Employee created");
            Ok(HttpResponse::Ok().json(employee))
        }
        Err(e) if ApiError::is_duplicate_key(&e) => {
            // Re-hire path: a terminated record with this email comes back
            // to life instead of a new row.
            let existing = fetch_by_email(pool.get_ref(), &payload.email).await?;

            match existing {
                Some(emp) if emp.status == "terminated" => {
                    sqlx::query(
                        r#"
                        UPDATE employees
                        SET status = 'active', hire_date = ?, leave_date = NULL,
                            first_name = ?, last_name = ?, phone = ?,
                            department_id = ?, designation_id = ?, manager_id = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(payload.hire_date)
                    .bind(&payload.first_name)
                    .bind(&payload.last_name)
                    .bind(&payload.phone)
                    .bind(payload.department_id)
                    .bind(payload.designation_id)
                    .bind(payload.manager_id)
                    .bind(emp.id)
                    .execute(pool.get_ref())
                    .await?;

                    let reactivated = fetch_by_email(pool.get_ref(), &payload.email)
                        .await?
                        .ok_or(ApiError::NotFound("Employee"))?;

                    info!(employee_id = reactivated.id, "Terminated employee reactivated");
                    Ok(HttpResponse::Ok().json(reactivated))
                }
                _ => Ok(HttpResponse::Conflict().json(json!({
                    "message": "Email or employee code already in use"
                }))),
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            Err(ApiError::Database(e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    enum FilterValue {
        U64(u64),
        Str(String),
    }

    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(department_id) = query.department_id {
        conditions.push("department_id = ?");
        bindings.push(FilterValue::U64(department_id));
    }

    if let Some(designation_id) = query.designation_id {
        conditions.push("designation_id = ?");
        bindings.push(FilterValue::U64(designation_id));
    }

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(FilterValue::Str(status.clone()));
    }

    if let Some(search) = &query.search {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.clone()),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {} FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        EMPLOYEE_COLUMNS, where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in bindings {
        data_query = match b {
            FilterValue::U64(v) => data_query.bind(v),
            FilterValue::Str(s) => data_query.bind(s),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(ApiError::Database)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Remove Employee. Soft delete: the record flips to `terminated` and keeps
/// its attendance and leave history.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee terminated"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let today = Utc::now().date_naive();

    let result = sqlx::query(
        r#"
        UPDATE employees
        SET status = 'terminated', leave_date = ?
        WHERE id = ? AND status != 'terminated'
        "#,
    )
    .bind(today)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee"));
    }

    info!(employee_id, "Employee terminated");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee terminated"
    })))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id: u64 = path.into_inner();

    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Employee"))?;

    Ok(HttpResponse::Ok().json(employee))
}
