use chrono::NaiveDateTime;
use sqlx::MySqlPool;


/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Bool(bool),
    DateTime(NaiveDateTime),
}


/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}


/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Column names come from code, never from request payloads.
/// Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if columns.is_empty() {
        return None;
    }

    // Build SET clause
    let set_clause = columns
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table, set_clause, id_column
    );

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Some(SqlUpdate { sql, values })
}


/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    pool: &MySqlPool,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_set_clause_in_column_order() {
        let update = build_update_sql(
            "hr_attendance",
            vec![
                ("OutUser", SqlValue::Bool(true)),
                ("attendance_status", SqlValue::String("Half Day".to_string())),
            ],
            "ID",
            9,
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE hr_attendance SET OutUser = ?, attendance_status = ? WHERE ID = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::Bool(true),
                SqlValue::String("Half Day".to_string()),
                SqlValue::U64(9),
            ]
        );
    }

    #[test]
    fn nothing_to_set_builds_nothing() {
        assert!(build_update_sql("hr_attendance", Vec::new(), "ID", 1).is_none());
    }
}
