use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, total_days};
use crate::utils::resolver;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Target employee (HR applying on someone's behalf); defaults to the
    /// caller's own employee record.
    #[schema(example = 123)]
    pub employee_id: Option<u64>,
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Flu")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    pub leave_type: Option<LeaveType>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-03", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApproveReq {
    #[schema(example = "Enjoy your holiday")]
    pub comments: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectReq {
    #[schema(example = "Blackout period")]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID (ignored for employee-role callers)
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = "annual")]
    /// Filter by leave type
    pub leave_type: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UpcomingQuery {
    #[schema(example = 5)]
    /// Result size, default 5, capped at 20
    pub limit: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct TypeCount {
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = 4)]
    pub count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveStatsResponse {
    #[schema(example = 3)]
    pub pending: i64,
    #[schema(example = 10)]
    pub approved: i64,
    #[schema(example = 2)]
    pub rejected: i64,
    #[schema(example = 15)]
    pub total: i64,
    pub by_type: Vec<TypeCount>,
}

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type, start_date, end_date, total_days, reason,
    status, approver_id, approved_at, approver_comments, created_at
"#;

async fn fetch_leave(pool: &MySqlPool, id: u64) -> Result<LeaveRequest, ApiError> {
    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
    sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Leave request"))
}

fn is_pending(record: &LeaveRequest) -> bool {
    LeaveStatus::from_str(&record.status).is_ok_and(|s| !s.is_terminal())
}

/// Employee-role callers may only touch their own requests.
async fn require_owner_or_hr(
    auth: &AuthUser,
    record: &LeaveRequest,
    pool: &MySqlPool,
) -> Result<(), ApiError> {
    if !auth.is_employee() {
        return Ok(());
    }
    let own = resolver::resolve_employee_id(auth, None, pool).await?;
    if own == record.employee_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Deduct the approved days from the employee's balance counter for the
/// leave type. Best-effort: unpaid leave has no counter and a missing
/// employee row just skips the deduction, it never fails the approval.
async fn deduct_balance(pool: &MySqlPool, record: &LeaveRequest) {
    let Ok(leave_type) = LeaveType::from_str(&record.leave_type) else {
        tracing::warn!(leave_id = record.id, leave_type = %record.leave_type, "Unknown leave type, balance deduction skipped");
        return;
    };
    let Some(column) = leave_type.balance_column() else {
        return;
    };

    let sql = format!(
        "UPDATE employees SET {col} = {col} - ? WHERE id = ?",
        col = column
    );
    if let Err(e) = sqlx::query(&sql)
        .bind(record.total_days)
        .bind(record.employee_id)
        .execute(pool)
        .await
    {
        tracing::warn!(
            error = %e,
            leave_id = record.id,
            employee_id = record.employee_id,
            "Balance deduction skipped"
        );
    }
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully", body = LeaveRequest),
        (status = 400, description = "No linked employee profile"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee targeting another employee's record")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let employee_id =
        resolver::resolve_acting_employee_id(&auth, payload.employee_id, pool.get_ref()).await?;

    // Inclusive day count, always derived server-side.
    let days = total_days(payload.start_date, payload.end_date);

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, total_days, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type.to_string())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(days)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await?;

    let record = fetch_leave(pool.get_ref(), result.last_insert_id()).await?;

    tracing::info!(employee_id, leave_id = record.id, days, "Leave request submitted");
    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Update leave request (only while pending)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to update")
    ),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Leave request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeave>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let record = fetch_leave(pool.get_ref(), leave_id).await?;
    require_owner_or_hr(&auth, &record, pool.get_ref()).await?;

    if !is_pending(&record) {
        return Err(ApiError::AlreadyProcessed);
    }

    let start_date = payload.start_date.unwrap_or(record.start_date);
    let end_date = payload.end_date.unwrap_or(record.end_date);
    let leave_type = payload
        .leave_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| record.leave_type.clone());
    let reason = payload.reason.clone().or_else(|| record.reason.clone());
    let days = total_days(start_date, end_date);

    // Conditional on status so a concurrent approval can't be overwritten.
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET leave_type = ?, start_date = ?, end_date = ?, total_days = ?, reason = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(&leave_type)
    .bind(start_date)
    .bind(end_date)
    .bind(days)
    .bind(&reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::AlreadyProcessed);
    }

    let updated = fetch_leave(pool.get_ref(), leave_id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body = ApproveReq,
    responses(
        (status = 200, description = "Leave approved successfully", body = LeaveRequest),
        (status = 400, description = "Already processed or self-approval", body = Object, example = json!({
            "message": "Leave request already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: Option<web::Json<ApproveReq>>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let comments = payload.and_then(|p| p.comments.clone());

    transition_leave(&auth, pool.get_ref(), leave_id, LeaveStatus::Approved, comments).await
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectReq,
    responses(
        (status = 200, description = "Leave rejected successfully", body = LeaveRequest),
        (status = 400, description = "Already processed or self-rejection", body = Object, example = json!({
            "message": "Leave request already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: Option<web::Json<RejectReq>>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let comments = payload.and_then(|p| p.reason.clone());

    transition_leave(&auth, pool.get_ref(), leave_id, LeaveStatus::Rejected, comments).await
}

/// Shared pending -> approved/rejected transition. The status guard lives in
/// the UPDATE itself (update-if-pending), so two concurrent approvals cannot
/// both win: the loser sees zero affected rows.
async fn transition_leave(
    auth: &AuthUser,
    pool: &MySqlPool,
    leave_id: u64,
    target: LeaveStatus,
    comments: Option<String>,
) -> Result<HttpResponse, ApiError> {
    let record = fetch_leave(pool, leave_id).await?;

    if !is_pending(&record) {
        return Err(ApiError::AlreadyProcessed);
    }

    // Only a positive identity match blocks the action; an unlinked admin
    // account may approve anyone's request.
    let approver_id = resolver::try_resolve_employee_id(auth, None, pool).await?;
    if approver_id == Some(record.employee_id) {
        return Err(ApiError::SelfApproval);
    }

    let now = Utc::now().naive_utc();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, approver_id = ?, approved_at = ?, approver_comments = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(target.to_string())
    .bind(approver_id)
    .bind(now)
    .bind(&comments)
    .bind(leave_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Lost the race to a concurrent transition.
        return Err(ApiError::AlreadyProcessed);
    }

    if target == LeaveStatus::Approved {
        deduct_balance(pool, &record).await;
    }

    let updated = fetch_leave(pool, leave_id).await?;

    tracing::info!(leave_id, status = %target, "Leave request processed");
    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Delete leave (only while pending; the row is kept and marked cancelled)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave request cancelled"),
        (status = 400, description = "Leave request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let record = fetch_leave(pool.get_ref(), leave_id).await?;
    require_owner_or_hr(&auth, &record, pool.get_ref()).await?;

    if !is_pending(&record) {
        return Err(ApiError::AlreadyProcessed);
    }

    // Same atomic transition shape as approve/reject: the status guard in
    // the WHERE clause is the concurrency protection.
    let result = sqlx::query(
        "UPDATE leave_requests SET status = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(LeaveStatus::Cancelled.to_string())
    .bind(leave_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::AlreadyProcessed);
    }

    tracing::info!(leave_id, "Leave request cancelled");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request cancelled"
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let record = fetch_leave(pool.get_ref(), leave_id).await?;
    require_owner_or_hr(&auth, &record, pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(record))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let employee_filter =
        resolver::scope_employee_filter(&auth, query.employee_id, pool.get_ref()).await?;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    if let Some(leave_type) = query.leave_type.as_deref() {
        where_sql.push_str(" AND leave_type = ?");
        args.push(FilterValue::Str(leave_type));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT {}
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        LEAVE_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Leave statistics endpoint (HR/Admin), feeds the dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/leave/stats",
    responses(
        (status = 200, description = "Leave statistics", body = LeaveStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM leave_requests GROUP BY status",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let count_for = |status: &str| {
        counts
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    };

    let pending = count_for("pending");
    let approved = count_for("approved");
    let rejected = count_for("rejected");

    let by_type = sqlx::query_as::<_, TypeCount>(
        "SELECT leave_type, COUNT(*) AS count FROM leave_requests GROUP BY leave_type",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(LeaveStatsResponse {
        pending,
        approved,
        rejected,
        total: pending + approved + rejected,
        by_type,
    }))
}

/// Upcoming approved leaves, ascending by start date. Feeds the dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/leave/upcoming",
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming approved leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn upcoming_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UpcomingQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let limit = query.limit.unwrap_or(5).clamp(1, 20);
    let today = Utc::now().date_naive();

    let sql = format!(
        r#"
        SELECT {}
        FROM leave_requests
        WHERE status = 'approved' AND start_date >= ?
        ORDER BY start_date ASC
        LIMIT ?
        "#,
        LEAVE_COLUMNS
    );

    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(today)
        .bind(limit)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}
