use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

use crate::error::EngineError;
use crate::model::employee::ActiveEmployee;

/// department_id => active employees of that department.
///
/// The employees table belongs to the HR side and changes rarely; a short
/// TTL keeps scan cycles from hammering it while picking up directory
/// changes within minutes.
static DIRECTORY_CACHE: Lazy<Cache<u64, Arc<Vec<ActiveEmployee>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300)) // 5 min TTL
        .build()
});

/// Active employees for a department, cached.
pub async fn active_employees(
    pool: &MySqlPool,
    department_id: u64,
) -> Result<Arc<Vec<ActiveEmployee>>, EngineError> {
    if let Some(hit) = DIRECTORY_CACHE.get(&department_id).await {
        return Ok(hit);
    }

    let employees = sqlx::query_as::<_, ActiveEmployee>(
        r#"
        SELECT id AS employee_id, department_id
        FROM employees
        WHERE department_id = ? AND status = 'active'
        ORDER BY id
        "#,
    )
    .bind(department_id)
    .fetch_all(pool)
    .await?;

    let employees = Arc::new(employees);
    DIRECTORY_CACHE
        .insert(department_id, employees.clone())
        .await;
    Ok(employees)
}

/// Pre-load every department's roster so the first scan cycle does not pay
/// the directory cost.
pub async fn warmup_directory_cache(pool: &MySqlPool) -> anyhow::Result<()> {
    let mut stream = sqlx::query_as::<_, (u64,)>(
        r#"
        SELECT DISTINCT department_id
        FROM employees
        WHERE status = 'active'
        "#,
    )
    .fetch(pool);

    let mut departments = 0usize;
    let mut total = 0usize;
    while let Some(row) = stream.next().await {
        let (department_id,) = row?;
        departments += 1;
        total += active_employees(pool, department_id).await?.len();
    }

    tracing::info!(
        departments,
        employees = total,
        "Directory cache warmup complete"
    );

    Ok(())
}
