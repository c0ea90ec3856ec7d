use std::collections::BTreeMap;
use std::marker::PhantomData;

use sqlx::{self, postgres::PgArguments, FromRow, PgPool};
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::filter::types::{SqlResult, SqlValue};

/// A column identifier from a closed, per-table set.
pub trait Column: Copy + std::fmt::Debug {
    fn name(self) -> &'static str;
}

/// A table whose statements may only name its own columns.
pub trait Table {
    const NAME: &'static str;
    type Column: Column;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("No fields to update")]
    EmptyFieldSet,

    #[error("Statement requires at least one condition")]
    EmptyConditionSet,
}

/// Columns and new values for a partial update, iterated in column-name order.
#[derive(Debug)]
pub struct FieldSet<T: Table> {
    columns: BTreeMap<&'static str, SqlValue>,
    _table: PhantomData<fn() -> T>,
}

/// Equality constraints scoping a statement, iterated in column-name order.
pub struct ConditionSet<T: Table> {
    columns: BTreeMap<&'static str, SqlValue>,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> FieldSet<T> {
    pub fn new() -> Self {
        Self { columns: BTreeMap::new(), _table: PhantomData }
    }

    pub fn set(&mut self, column: T::Column, value: impl Into<SqlValue>) -> &mut Self {
        self.columns.insert(column.name(), value.into());
        self
    }

    /// Set the column only when a value is present.
    pub fn set_some<V: Into<SqlValue>>(&mut self, column: T::Column, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    pub fn with(mut self, column: T::Column, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn contains(&self, column: T::Column) -> bool {
        self.columns.contains_key(column.name())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<T: Table> Default for FieldSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Table> ConditionSet<T> {
    pub fn new() -> Self {
        Self { columns: BTreeMap::new(), _table: PhantomData }
    }

    pub fn with(mut self, column: T::Column, value: impl Into<SqlValue>) -> Self {
        self.columns.insert(column.name(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<T: Table> Default for ConditionSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Params {
    values: Vec<SqlValue>,
}

impl Params {
    fn push(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    fn equalities(&mut self, columns: &BTreeMap<&'static str, SqlValue>) -> Vec<String> {
        columns
            .iter()
            .map(|(column, value)| format!("\"{}\" = {}", column, self.push(value.clone())))
            .collect()
    }
}

/// `UPDATE <table> SET c1 = $1, .. WHERE k1 = $n AND ..`
///
/// Field parameters are numbered first, condition parameters continue the same
/// sequence. An empty condition set emits no WHERE clause and so touches every
/// row; repositories always scope their updates.
pub fn build_update<T: Table>(
    fields: &FieldSet<T>,
    conditions: &ConditionSet<T>,
) -> Result<SqlResult, QueryError> {
    if fields.is_empty() {
        return Err(QueryError::EmptyFieldSet);
    }

    let mut params = Params::default();
    let set_clause = params.equalities(&fields.columns).join(", ");
    let mut query = format!("UPDATE \"{}\" SET {}", T::NAME, set_clause);

    if !conditions.is_empty() {
        let where_clause = params.equalities(&conditions.columns).join(" AND ");
        query.push_str(" WHERE ");
        query.push_str(&where_clause);
    }

    Ok(SqlResult { query, params: params.values })
}

/// `DELETE FROM <table> WHERE k1 = $1 AND ..`. Unscoped deletes are refused.
pub fn build_delete<T: Table>(conditions: &ConditionSet<T>) -> Result<SqlResult, QueryError> {
    if conditions.is_empty() {
        return Err(QueryError::EmptyConditionSet);
    }

    let mut params = Params::default();
    let where_clause = params.equalities(&conditions.columns).join(" AND ");

    Ok(SqlResult {
        query: format!("DELETE FROM \"{}\" WHERE {}", T::NAME, where_clause),
        params: params.values,
    })
}

/// Run a statement and return the number of rows it affected.
pub async fn execute(pool: &PgPool, sql_result: &SqlResult) -> Result<u64, DatabaseError> {
    let mut q = sqlx::query(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query(q, p);
    }
    let result = q.execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn fetch_all<T>(pool: &PgPool, sql_result: &SqlResult) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    let rows = q.fetch_all(pool).await?;
    Ok(rows)
}

/// A scoped write that matched nothing either had no target row or the row
/// belongs to someone else. Both are reported the same way.
pub fn ensure_rows_affected(rows: u64) -> Result<(), DatabaseError> {
    if rows == 0 {
        return Err(DatabaseError::NotFoundOrForbidden);
    }
    Ok(())
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Uuid(u) => q.bind(*u),
        SqlValue::Timestamp(t) => q.bind(*t),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Uuid(u) => q.bind(*u),
        SqlValue::Timestamp(t) => q.bind(*t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum TestColumn {
        A,
        B,
        Id,
    }

    impl Column for TestColumn {
        fn name(self) -> &'static str {
            match self {
                TestColumn::A => "a",
                TestColumn::B => "b",
                TestColumn::Id => "id",
            }
        }
    }

    struct TestTable;

    impl Table for TestTable {
        const NAME: &'static str = "t";
        type Column = TestColumn;
    }

    #[test]
    fn update_numbers_fields_then_conditions() {
        let fields = FieldSet::<TestTable>::new()
            .with(TestColumn::A, 1i64)
            .with(TestColumn::B, 2i64);
        let conditions = ConditionSet::<TestTable>::new().with(TestColumn::Id, 5i64);

        let sql = build_update(&fields, &conditions).unwrap();

        assert_eq!(sql.query, "UPDATE \"t\" SET \"a\" = $1, \"b\" = $2 WHERE \"id\" = $3");
        assert_eq!(sql.params, vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(5)]);
    }

    #[test]
    fn column_order_is_independent_of_insertion_order() {
        let forward = FieldSet::<TestTable>::new()
            .with(TestColumn::A, "x")
            .with(TestColumn::B, "y");
        let reverse = FieldSet::<TestTable>::new()
            .with(TestColumn::B, "y")
            .with(TestColumn::A, "x");
        let conditions = ConditionSet::<TestTable>::new().with(TestColumn::Id, 1i64);

        assert_eq!(
            build_update(&forward, &conditions).unwrap(),
            build_update(&reverse, &conditions).unwrap()
        );
    }

    #[test]
    fn multiple_conditions_are_anded_in_name_order() {
        let fields = FieldSet::<TestTable>::new().with(TestColumn::A, true);
        let conditions = ConditionSet::<TestTable>::new()
            .with(TestColumn::Id, 7i64)
            .with(TestColumn::B, "owner");

        let sql = build_update(&fields, &conditions).unwrap();

        assert_eq!(sql.query, "UPDATE \"t\" SET \"a\" = $1 WHERE \"b\" = $2 AND \"id\" = $3");
        assert_eq!(
            sql.params,
            vec![SqlValue::Bool(true), SqlValue::Text("owner".into()), SqlValue::Int(7)]
        );
    }

    #[test]
    fn empty_field_set_is_rejected() {
        let conditions = ConditionSet::<TestTable>::new().with(TestColumn::Id, 1i64);
        assert_eq!(
            build_update(&FieldSet::<TestTable>::new(), &conditions),
            Err(QueryError::EmptyFieldSet)
        );
    }

    #[test]
    fn empty_condition_set_emits_no_where() {
        let fields = FieldSet::<TestTable>::new().with(TestColumn::A, 1i64);
        let sql = build_update(&fields, &ConditionSet::new()).unwrap();

        assert_eq!(sql.query, "UPDATE \"t\" SET \"a\" = $1");
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn setting_a_column_twice_keeps_last_value() {
        let mut fields = FieldSet::<TestTable>::new();
        fields.set(TestColumn::A, 1i64).set(TestColumn::A, 9i64);

        assert_eq!(fields.len(), 1);
        let sql = build_update(&fields, &ConditionSet::new()).unwrap();
        assert_eq!(sql.params, vec![SqlValue::Int(9)]);
    }

    #[test]
    fn set_some_skips_missing_values() {
        let mut fields = FieldSet::<TestTable>::new();
        fields
            .set_some(TestColumn::A, None::<String>)
            .set_some(TestColumn::B, Some("b"));

        assert!(!fields.contains(TestColumn::A));
        assert!(fields.contains(TestColumn::B));
    }

    #[test]
    fn values_never_reach_sql_text() {
        let hostile = "x'; DROP TABLE t; --";
        let fields = FieldSet::<TestTable>::new().with(TestColumn::A, hostile);
        let conditions = ConditionSet::<TestTable>::new().with(TestColumn::Id, hostile);

        let sql = build_update(&fields, &conditions).unwrap();

        assert!(!sql.query.contains("DROP"));
        assert_eq!(sql.params, vec![SqlValue::Text(hostile.into()), SqlValue::Text(hostile.into())]);
    }

    #[test]
    fn delete_is_scoped() {
        let conditions = ConditionSet::<TestTable>::new()
            .with(TestColumn::Id, 3i64)
            .with(TestColumn::B, "me");

        let sql = build_delete(&conditions).unwrap();

        assert_eq!(sql.query, "DELETE FROM \"t\" WHERE \"b\" = $1 AND \"id\" = $2");
        assert_eq!(sql.params.len(), 2);
        assert_eq!(build_delete(&ConditionSet::<TestTable>::new()), Err(QueryError::EmptyConditionSet));
    }

    #[test]
    fn zero_rows_is_not_found_or_forbidden() {
        assert!(matches!(ensure_rows_affected(0), Err(DatabaseError::NotFoundOrForbidden)));
        assert!(ensure_rows_affected(1).is_ok());
    }
}
