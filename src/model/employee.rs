use serde::Serialize;
use sqlx::FromRow;

/// Read-only row from the employee directory. The directory itself is an
/// external collaborator; the engine only needs to know who is active in a
/// department.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActiveEmployee {
    pub employee_id: u64,
    pub department_id: u64,
}
