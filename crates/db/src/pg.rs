//! Postgres-backed [`DataStore`].
//!
//! Rows travel as JSONB: reads select `to_jsonb(t)`, writes go through
//! `jsonb_populate_record(set)` so column types come from the table
//! definition. Every identifier is validated and quoted before it is
//! interpolated; every value is a bind parameter.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Direction, Entity, Query, Row};
use crate::store::DataStore;
use crate::DbPool;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// A SQL statement with its text bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub binds: Vec<Option<String>>,
}

/// Store backed by a Postgres connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and wrap the pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = crate::create_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn fetch_where(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let statement = build_select(query)?;
        let mut q = sqlx::query_scalar::<_, Value>(&statement.sql);
        for bind in statement.binds {
            q = q.bind(bind);
        }
        let values = q.fetch_all(&self.pool).await?;

        values
            .into_iter()
            .map(|value| match value {
                Value::Object(row) => Ok(row),
                other => Err(StoreError::Decode {
                    entity: query.entity.label(),
                    message: format!("expected an object, got {other}"),
                }),
            })
            .collect()
    }

    async fn update(&self, entity: Entity, id: &str, fields: Row) -> Result<(), StoreError> {
        let sql = build_update(entity, &fields)?;
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;
        tracing::debug!(
            table = entity.table(),
            id,
            rows_affected = result.rows_affected(),
            "Updated row"
        );
        Ok(())
    }

    async fn insert(&self, entity: Entity, rows: Vec<Row>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let sql = build_insert(entity, &rows)?;
        let payload = Value::Array(rows.into_iter().map(Value::Object).collect());
        sqlx::query(&sql).bind(payload).execute(&self.pool).await?;
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError> {
        let statement = build_rpc(function, &args)?;
        let mut q = sqlx::query_scalar::<_, Option<Value>>(&statement.sql);
        for bind in statement.binds {
            q = q.bind(bind);
        }
        let mut results: Vec<Value> = q
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        Ok(match results.len() {
            0 => Value::Null,
            1 => results.remove(0),
            _ => Value::Array(results),
        })
    }
}

// ---------------------------------------------------------------------------
// SQL construction
// ---------------------------------------------------------------------------

fn quote(identifier: &str) -> Result<String, StoreError> {
    if IDENTIFIER_RE.is_match(identifier) {
        Ok(format!("\"{identifier}\""))
    } else {
        Err(StoreError::InvalidQuery(format!(
            "'{identifier}' is not a valid identifier"
        )))
    }
}

/// Render a filter or argument value as a text bind. `None` binds NULL.
fn text_bind(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn build_select(query: &Query) -> Result<Statement, StoreError> {
    let mut sql = format!(
        "SELECT to_jsonb(t) FROM {} AS t",
        quote(query.entity.table())?
    );
    let mut binds = Vec::new();

    let mut clauses = Vec::with_capacity(query.filters.len());
    for filter in &query.filters {
        let column = quote(&filter.column)?;
        if filter.value.is_null() {
            clauses.push(format!("t.{column} IS NULL"));
        } else {
            binds.push(text_bind(&filter.value));
            clauses.push(format!("t.{column}::text = ${}", binds.len()));
        }
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let mut orderings = Vec::with_capacity(query.ordering.len());
    for ordering in &query.ordering {
        let direction = match ordering.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        orderings.push(format!("t.{} {direction}", quote(&ordering.column)?));
    }
    if !orderings.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&orderings.join(", "));
    }

    Ok(Statement { sql, binds })
}

/// `$1` is the key, `$2` the JSONB object of new field values.
pub(crate) fn build_update(entity: Entity, fields: &Row) -> Result<String, StoreError> {
    if fields.is_empty() {
        return Err(StoreError::InvalidQuery(format!(
            "update of {} has no fields",
            entity.table()
        )));
    }
    let table = quote(entity.table())?;
    let assignments = fields
        .keys()
        .map(|column| quote(column).map(|c| format!("{c} = r.{c}")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!(
        "UPDATE {table} AS t SET {} FROM jsonb_populate_record(NULL::{table}, $2) AS r \
         WHERE t.{}::text = $1",
        assignments.join(", "),
        quote(entity.key_column())?
    ))
}

/// `$1` is a JSONB array of row objects.
pub(crate) fn build_insert(entity: Entity, rows: &[Row]) -> Result<String, StoreError> {
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    if columns.is_empty() {
        return Err(StoreError::InvalidQuery(format!(
            "insert into {} has no columns",
            entity.table()
        )));
    }
    let table = quote(entity.table())?;
    let quoted = columns
        .into_iter()
        .map(quote)
        .collect::<Result<Vec<_>, _>>()?;
    let selected: Vec<String> = quoted.iter().map(|c| format!("r.{c}")).collect();

    Ok(format!(
        "INSERT INTO {table} ({}) SELECT {} FROM jsonb_populate_recordset(NULL::{table}, $1) AS r",
        quoted.join(", "),
        selected.join(", ")
    ))
}

/// Named-argument call; every argument is bound as text.
pub(crate) fn build_rpc(function: &str, args: &Value) -> Result<Statement, StoreError> {
    let function = quote(function)?;
    let mut binds = Vec::new();
    let mut params = Vec::new();

    match args {
        Value::Null => {}
        Value::Object(map) => {
            for (name, value) in map {
                binds.push(text_bind(value));
                params.push(format!("{} => ${}", quote(name)?, binds.len()));
            }
        }
        other => {
            return Err(StoreError::InvalidQuery(format!(
                "rpc arguments must be an object, got {other}"
            )));
        }
    }

    Ok(Statement {
        sql: format!("SELECT to_jsonb({function}({}))", params.join(", ")),
        binds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn select_with_filters_and_ordering() {
        let query = Query::new(Entity::ActivityLogs)
            .eq("userId", "u1")
            .eq("status", "approved")
            .order_by("date", Direction::Desc);
        let statement = build_select(&query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT to_jsonb(t) FROM \"logs\" AS t \
             WHERE t.\"userId\"::text = $1 AND t.\"status\"::text = $2 \
             ORDER BY t.\"date\" DESC"
        );
        assert_eq!(
            statement.binds,
            vec![Some("u1".to_string()), Some("approved".to_string())]
        );
    }

    #[test]
    fn null_filter_uses_is_null() {
        let query = Query::new(Entity::Users).eq("level", Value::Null);
        let statement = build_select(&query).unwrap();
        assert!(statement.sql.ends_with("WHERE t.\"level\" IS NULL"));
        assert!(statement.binds.is_empty());
    }

    #[test]
    fn numeric_filters_bind_as_text() {
        let query = Query::new(Entity::StudioMembers).eq("studio_id", 12);
        let statement = build_select(&query).unwrap();
        assert_eq!(statement.binds, vec![Some("12".to_string())]);
    }

    #[test]
    fn hostile_identifiers_are_rejected() {
        let query = Query::new(Entity::Users).eq("id\" OR 1=1 --", "x");
        assert_matches!(build_select(&query), Err(StoreError::InvalidQuery(_)));

        let query = Query::new(Entity::Users).order_by("points; DROP TABLE users", Direction::Asc);
        assert_matches!(build_select(&query), Err(StoreError::InvalidQuery(_)));
    }

    #[test]
    fn update_assigns_from_populated_record() {
        let sql = build_update(Entity::Users, &row(json!({"points": 8, "level": 1}))).unwrap();
        assert_eq!(
            sql,
            "UPDATE \"users\" AS t SET \"level\" = r.\"level\", \"points\" = r.\"points\" \
             FROM jsonb_populate_record(NULL::\"users\", $2) AS r WHERE t.\"id\"::text = $1"
        );
    }

    #[test]
    fn empty_update_is_rejected() {
        assert_matches!(
            build_update(Entity::Users, &Row::new()),
            Err(StoreError::InvalidQuery(_))
        );
    }

    #[test]
    fn insert_uses_union_of_columns() {
        let rows = vec![
            row(json!({"userId": "u1", "message": "a"})),
            row(json!({"userId": "u2"})),
        ];
        let sql = build_insert(Entity::Notifications, &rows).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"notifications\" (\"message\", \"userId\") \
             SELECT r.\"message\", r.\"userId\" \
             FROM jsonb_populate_recordset(NULL::\"notifications\", $1) AS r"
        );
    }

    #[test]
    fn rpc_uses_named_arguments() {
        let statement = build_rpc("accept_studio_invite", &json!({"p_token": "abc"})).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT to_jsonb(\"accept_studio_invite\"(\"p_token\" => $1))"
        );
        assert_eq!(statement.binds, vec![Some("abc".to_string())]);
    }

    #[test]
    fn rpc_rejects_non_object_arguments() {
        assert_matches!(
            build_rpc("accept_studio_invite", &json!(["abc"])),
            Err(StoreError::InvalidQuery(_))
        );
    }
}
