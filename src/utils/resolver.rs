use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use sqlx::MySqlPool;

/// Precedence between an explicitly requested target employee and the
/// principal's own linked employee record. An explicit target always wins:
/// that is HR/admin acting on someone else's behalf.
pub fn pick_target(explicit: Option<u64>, linked: Option<u64>) -> Option<u64> {
    explicit.or(linked)
}

/// Resolves the employee id a request should act on, without treating an
/// unlinked account as an error. Fallback chain: explicit target, then the
/// principal's linked employee id, then a lookup by the principal's email.
pub async fn try_resolve_employee_id(
    auth: &AuthUser,
    explicit: Option<u64>,
    pool: &MySqlPool,
) -> Result<Option<u64>, ApiError> {
    if let Some(id) = pick_target(explicit, auth.employee_id) {
        return Ok(Some(id));
    }

    let id = sqlx::query_scalar::<_, u64>("SELECT id FROM employees WHERE email = ?")
        .bind(&auth.email)
        .fetch_optional(pool)
        .await?;

    Ok(id)
}

/// Same as [`try_resolve_employee_id`] but an unresolvable principal is a
/// client error: clock-in/out and leave creation need an employee profile.
pub async fn resolve_employee_id(
    auth: &AuthUser,
    explicit: Option<u64>,
    pool: &MySqlPool,
) -> Result<u64, ApiError> {
    try_resolve_employee_id(auth, explicit, pool)
        .await?
        .ok_or(ApiError::UnlinkedAccount)
}

/// Explicit targets on mutations are an HR/admin affordance: an
/// employee-role caller may only act on their own record, so an explicit
/// target naming anyone else is rejected outright.
pub fn own_or_reject(own: u64, explicit: Option<u64>) -> Result<u64, ApiError> {
    match explicit {
        Some(target) if target != own => Err(ApiError::Forbidden),
        _ => Ok(own),
    }
}

/// Resolves the employee id a mutation (clock-in/out, leave creation) acts
/// on, enforcing role scoping: HR/admin may name any target, employees only
/// themselves.
pub async fn resolve_acting_employee_id(
    auth: &AuthUser,
    explicit: Option<u64>,
    pool: &MySqlPool,
) -> Result<u64, ApiError> {
    if auth.is_employee() {
        let own = resolve_employee_id(auth, None, pool).await?;
        own_or_reject(own, explicit)
    } else {
        resolve_employee_id(auth, explicit, pool).await
    }
}

/// Visibility scoping for list queries: employee-role principals only ever
/// see their own records, whatever filter they pass; HR/admin see everything
/// unless they narrow it themselves.
pub async fn scope_employee_filter(
    auth: &AuthUser,
    requested: Option<u64>,
    pool: &MySqlPool,
) -> Result<Option<u64>, ApiError> {
    if auth.is_employee() {
        Ok(Some(resolve_employee_id(auth, None, pool).await?))
    } else {
        Ok(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_target_wins_over_linked_id() {
        assert_eq!(pick_target(Some(7), Some(3)), Some(7));
    }

    #[test]
    fn linked_id_used_when_no_explicit_target() {
        assert_eq!(pick_target(None, Some(3)), Some(3));
    }

    #[test]
    fn nothing_resolves_to_nothing() {
        assert_eq!(pick_target(None, None), None);
    }

    #[test]
    fn employee_may_name_own_record_explicitly() {
        assert_eq!(own_or_reject(3, Some(3)).unwrap(), 3);
    }

    #[test]
    fn employee_naming_someone_else_is_forbidden() {
        assert!(matches!(own_or_reject(3, Some(7)), Err(ApiError::Forbidden)));
    }

    #[test]
    fn employee_without_explicit_target_acts_on_self() {
        assert_eq!(own_or_reject(3, None).unwrap(), 3);
    }
}
