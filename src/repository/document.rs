//! Generic tenant-scoped document store
//!
//! Feature collections live in tables shaped
//! `(id, tenant_id, document JSON, created_at, updated_at)`. Every statement
//! built here starts its WHERE clause with `tenant_id = ?` taken from a
//! [`TenantScope`], so a query without a tenant cannot be expressed.

use super::TenantScope;
use crate::domain::{Document, Page, PageRequest, Stored, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use std::cmp::Ordering;

/// Fields that live in real columns rather than inside `document`
const ID_FIELD: &str = "id";
const CREATED_AT_FIELD: &str = "createdAt";
const UPDATED_AT_FIELD: &str = "updatedAt";

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
    /// Array field contains the value
    Contains(&'static str, Value),
}

/// Conjunction of field predicates over camelCase document fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.conditions.push(Condition::Eq(field, to_json(value)));
        self
    }

    pub fn ne(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.conditions.push(Condition::Ne(field, to_json(value)));
        self
    }

    pub fn gte(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.conditions.push(Condition::Gte(field, to_json(value)));
        self
    }

    pub fn lte(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.conditions.push(Condition::Lte(field, to_json(value)));
        self
    }

    pub fn contains(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.conditions
            .push(Condition::Contains(field, to_json(value)));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate against a serialized [`Stored`] document
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, value) => doc.get(*field) == Some(value),
            Condition::Ne(field, value) => doc.get(*field) != Some(value),
            Condition::Gte(field, value) => doc
                .get(*field)
                .and_then(|v| compare_json(v, value))
                .is_some_and(|o| o != Ordering::Less),
            Condition::Lte(field, value) => doc
                .get(*field)
                .and_then(|v| compare_json(v, value))
                .is_some_and(|o| o != Ordering::Greater),
            Condition::Contains(field, value) => doc
                .get(*field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        })
    }
}

fn compare_json(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// Ordering of two serialized documents under this sort
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = match (a.get(self.field), b.get(self.field)) {
            (Some(x), Some(y)) => compare_json(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Sort::desc(CREATED_AT_FIELD)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(&'static str, Value),
    Inc(&'static str, i64),
    /// Append to an array field unless already present
    AddToSet(&'static str, Value),
    /// Remove a string element from an array field
    Pull(&'static str, Value),
}

/// Field-level modifications applied inside one statement. Stamps
/// `updatedAt` unless built with [`Update::untouched`].
///
/// In SQL every op reads the stored document, so use at most one op per field.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
    touch: bool,
}

impl Default for Update {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            touch: true,
        }
    }
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `updatedAt` as it is, for counters that are not edits
    pub fn untouched(mut self) -> Self {
        self.touch = false;
        self
    }

    pub fn touches(&self) -> bool {
        self.touch
    }

    pub fn set(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.ops.push(UpdateOp::Set(field, to_json(value)));
        self
    }

    /// Set only when `value` is `Some`
    pub fn set_opt<T: Serialize>(self, field: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self,
        }
    }

    pub fn inc(mut self, field: &'static str, by: i64) -> Self {
        self.ops.push(UpdateOp::Inc(field, by));
        self
    }

    pub fn add_to_set(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.ops.push(UpdateOp::AddToSet(field, to_json(value)));
        self
    }

    pub fn pull(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.ops.push(UpdateOp::Pull(field, to_json(value)));
        self
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply to a serialized document in place
    pub fn apply(&self, doc: &mut Value) {
        let Some(object) = doc.as_object_mut() else {
            return;
        };
        for op in &self.ops {
            match op {
                UpdateOp::Set(field, value) => {
                    object.insert(field.to_string(), value.clone());
                }
                UpdateOp::Inc(field, by) => {
                    let current = object.get(*field).and_then(Value::as_i64).unwrap_or(0);
                    object.insert(field.to_string(), Value::from(current + by));
                }
                UpdateOp::AddToSet(field, value) => {
                    let mut items = take_array(object, field);
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                    object.insert(field.to_string(), Value::Array(items));
                }
                UpdateOp::Pull(field, value) => {
                    let mut items = take_array(object, field);
                    items.retain(|item| item != value);
                    object.insert(field.to_string(), Value::Array(items));
                }
            }
        }
    }
}

fn take_array(object: &mut serde_json::Map<String, Value>, field: &str) -> Vec<Value> {
    match object.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// CRUD over one tenant-owned collection. Every operation is confined to
/// the tenant named by `scope`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScopedRepository<E: Document>: Send + Sync {
    async fn create(&self, scope: &TenantScope, doc: E) -> Result<Stored<E>>;
    async fn find_by_id(&self, scope: &TenantScope, id: StringUuid) -> Result<Option<Stored<E>>>;
    async fn find_one(&self, scope: &TenantScope, filter: Filter) -> Result<Option<Stored<E>>>;
    async fn find(&self, scope: &TenantScope, filter: Filter, sort: Sort)
        -> Result<Vec<Stored<E>>>;
    async fn find_page(
        &self,
        scope: &TenantScope,
        filter: Filter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Page<Stored<E>>>;
    async fn count(&self, scope: &TenantScope, filter: Filter) -> Result<i64>;
    /// `None` if no document with `id` exists in this tenant
    async fn update(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        update: Update,
    ) -> Result<Option<Stored<E>>>;
    async fn update_one(
        &self,
        scope: &TenantScope,
        filter: Filter,
        update: Update,
    ) -> Result<Option<Stored<E>>>;
    /// True if a document was removed
    async fn delete(&self, scope: &TenantScope, id: StringUuid) -> Result<bool>;
    async fn delete_one(&self, scope: &TenantScope, filter: Filter) -> Result<bool>;
    async fn delete_many(&self, scope: &TenantScope, filter: Filter) -> Result<u64>;
    async fn exists(&self, scope: &TenantScope, filter: Filter) -> Result<bool>;
}

// ==================== SQL building ====================

fn check_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::Internal(anyhow::anyhow!(
            "Invalid document field or collection: {}",
            name
        )))
    }
}

fn field_expr(field: &str) -> Result<String> {
    check_identifier(field)?;
    Ok(match field {
        ID_FIELD => "id".to_string(),
        CREATED_AT_FIELD => "created_at".to_string(),
        UPDATED_AT_FIELD => "updated_at".to_string(),
        _ => format!("JSON_EXTRACT(document, '$.{}')", field),
    })
}

/// The array at `field`, or an empty array when absent
fn array_expr(field: &str) -> Result<String> {
    Ok(format!("COALESCE({}, JSON_ARRAY())", field_expr(field)?))
}

fn json_path(field: &str) -> Result<String> {
    check_identifier(field)?;
    Ok(format!("'$.{}'", field))
}

fn is_column(field: &str) -> bool {
    matches!(field, ID_FIELD | CREATED_AT_FIELD | UPDATED_AT_FIELD)
}

/// Column values bind as plain scalars, document values as JSON text
fn push_value(qb: &mut QueryBuilder<'static, MySql>, field: &str, value: &Value) {
    if is_column(field) {
        match value {
            Value::String(s) => qb.push_bind(s.clone()),
            other => qb.push_bind(other.to_string()),
        };
    } else {
        qb.push("CAST(");
        qb.push_bind(value.to_string());
        qb.push(" AS JSON)");
    }
}

/// ` WHERE tenant_id = ? [AND ...]`
pub(crate) fn push_scoped_where(
    qb: &mut QueryBuilder<'static, MySql>,
    scope: &TenantScope,
    filter: &Filter,
) -> Result<()> {
    qb.push(" WHERE tenant_id = ");
    qb.push_bind(scope.tenant_id());

    for condition in filter.conditions() {
        qb.push(" AND ");
        match condition {
            Condition::Eq(field, value) => {
                qb.push(field_expr(field)?);
                qb.push(" = ");
                push_value(qb, field, value);
            }
            Condition::Ne(field, value) => {
                qb.push("NOT (");
                qb.push(field_expr(field)?);
                qb.push(" <=> ");
                push_value(qb, field, value);
                qb.push(")");
            }
            Condition::Gte(field, value) => {
                qb.push(field_expr(field)?);
                qb.push(" >= ");
                push_value(qb, field, value);
            }
            Condition::Lte(field, value) => {
                qb.push(field_expr(field)?);
                qb.push(" <= ");
                push_value(qb, field, value);
            }
            Condition::Contains(field, value) => {
                qb.push("JSON_CONTAINS(");
                qb.push(field_expr(field)?);
                qb.push(", CAST(");
                qb.push_bind(value.to_string());
                qb.push(" AS JSON))");
            }
        }
    }
    Ok(())
}

fn push_order(qb: &mut QueryBuilder<'static, MySql>, sort: &Sort) -> Result<()> {
    qb.push(" ORDER BY ");
    qb.push(field_expr(sort.field)?);
    qb.push(match sort.direction {
        Direction::Asc => " ASC",
        Direction::Desc => " DESC",
    });
    Ok(())
}

pub(crate) fn build_select(
    collection: &str,
    scope: &TenantScope,
    filter: &Filter,
    sort: &Sort,
    limit: Option<(i64, i64)>,
) -> Result<QueryBuilder<'static, MySql>> {
    check_identifier(collection)?;
    let mut qb = QueryBuilder::new(format!(
        "SELECT id, tenant_id, document, created_at, updated_at FROM {}",
        collection
    ));
    push_scoped_where(&mut qb, scope, filter)?;
    push_order(&mut qb, sort)?;
    if let Some((limit, offset)) = limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
    }
    Ok(qb)
}

pub(crate) fn build_count(
    collection: &str,
    scope: &TenantScope,
    filter: &Filter,
) -> Result<QueryBuilder<'static, MySql>> {
    check_identifier(collection)?;
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", collection));
    push_scoped_where(&mut qb, scope, filter)?;
    Ok(qb)
}

pub(crate) fn build_update(
    collection: &str,
    scope: &TenantScope,
    id: StringUuid,
    update: &Update,
) -> Result<QueryBuilder<'static, MySql>> {
    check_identifier(collection)?;
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", collection));

    if !update.is_empty() {
        qb.push("document = JSON_SET(document");
        for op in update.ops() {
            match op {
                UpdateOp::Set(field, value) => {
                    qb.push(", ");
                    qb.push(json_path(field)?);
                    qb.push(", CAST(");
                    qb.push_bind(value.to_string());
                    qb.push(" AS JSON)");
                }
                UpdateOp::Inc(field, by) => {
                    qb.push(", ");
                    qb.push(json_path(field)?);
                    qb.push(", COALESCE(");
                    qb.push(field_expr(field)?);
                    qb.push(", 0) + ");
                    qb.push_bind(*by);
                }
                UpdateOp::AddToSet(field, value) => {
                    let array = array_expr(field)?;
                    qb.push(", ");
                    qb.push(json_path(field)?);
                    qb.push(format!(", IF(JSON_CONTAINS({}, CAST(", array));
                    qb.push_bind(value.to_string());
                    qb.push(format!(" AS JSON)), {}, JSON_ARRAY_APPEND({}, '$', CAST(", array, array));
                    qb.push_bind(value.to_string());
                    qb.push(" AS JSON)))");
                }
                UpdateOp::Pull(field, value) => {
                    let Value::String(needle) = value else {
                        return Err(AppError::Internal(anyhow::anyhow!(
                            "Pull on {} needs a string value",
                            field
                        )));
                    };
                    let array = array_expr(field)?;
                    qb.push(", ");
                    qb.push(json_path(field)?);
                    qb.push(format!(", IF(JSON_SEARCH({}, 'one', ", array));
                    qb.push_bind(needle.clone());
                    qb.push(format!(") IS NULL, {}, JSON_REMOVE({}, JSON_UNQUOTE(JSON_SEARCH({}, 'one', ", array, array, array));
                    qb.push_bind(needle.clone());
                    qb.push("))))");
                }
            }
        }
        qb.push(")");
    }
    match (update.is_empty(), update.touches()) {
        (true, true) => {
            qb.push("updated_at = ");
            qb.push_bind(Utc::now());
        }
        (false, true) => {
            qb.push(", updated_at = ");
            qb.push_bind(Utc::now());
        }
        (true, false) => {
            qb.push("updated_at = updated_at");
        }
        (false, false) => {}
    }

    push_scoped_where(&mut qb, scope, &Filter::new().eq(ID_FIELD, id))?;
    Ok(qb)
}

pub(crate) fn build_delete(
    collection: &str,
    scope: &TenantScope,
    filter: &Filter,
    only_one: bool,
) -> Result<QueryBuilder<'static, MySql>> {
    check_identifier(collection)?;
    let mut qb = QueryBuilder::new(format!("DELETE FROM {}", collection));
    push_scoped_where(&mut qb, scope, filter)?;
    if only_one {
        push_order(&mut qb, &Sort::default())?;
        qb.push(" LIMIT 1");
    }
    Ok(qb)
}

// ==================== MySQL store ====================

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: StringUuid,
    tenant_id: StringUuid,
    document: sqlx::types::Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_stored<E: Document>(self) -> Result<Stored<E>> {
        let doc: E = serde_json::from_value(self.document.0).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Corrupt {} document {}: {}",
                E::COLLECTION,
                self.id,
                e
            ))
        })?;
        Ok(Stored {
            id: self.id,
            tenant_id: self.tenant_id,
            doc,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// MySQL implementation of [`ScopedRepository`] for every document type
#[derive(Clone)]
pub struct ScopedStore {
    pool: MySqlPool,
}

impl ScopedStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<E: Document> ScopedRepository<E> for ScopedStore {
    async fn create(&self, scope: &TenantScope, doc: E) -> Result<Stored<E>> {
        check_identifier(E::COLLECTION)?;
        let id = StringUuid::new_v4();
        let now = Utc::now();
        let document = serde_json::to_string(&doc).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, tenant_id, document, created_at, updated_at) VALUES (?, ?, CAST(? AS JSON), ?, ?)",
            E::COLLECTION
        ))
        .bind(id)
        .bind(scope.tenant_id())
        .bind(document)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Stored {
            id,
            tenant_id: scope.tenant_id(),
            doc,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, scope: &TenantScope, id: StringUuid) -> Result<Option<Stored<E>>> {
        self.find_one(scope, Filter::new().eq(ID_FIELD, id)).await
    }

    async fn find_one(&self, scope: &TenantScope, filter: Filter) -> Result<Option<Stored<E>>> {
        let mut qb = build_select(E::COLLECTION, scope, &filter, &Sort::default(), Some((1, 0)))?;
        let row = qb
            .build_query_as::<DocumentRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(DocumentRow::into_stored).transpose()
    }

    async fn find(
        &self,
        scope: &TenantScope,
        filter: Filter,
        sort: Sort,
    ) -> Result<Vec<Stored<E>>> {
        let mut qb = build_select(E::COLLECTION, scope, &filter, &sort, None)?;
        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(DocumentRow::into_stored).collect()
    }

    async fn find_page(
        &self,
        scope: &TenantScope,
        filter: Filter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Page<Stored<E>>> {
        let total = ScopedRepository::<E>::count(self, scope, filter.clone()).await?;
        let mut qb = build_select(
            E::COLLECTION,
            scope,
            &filter,
            &sort,
            Some((page.limit(), page.skip())),
        )?;
        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;
        let data = rows
            .into_iter()
            .map(DocumentRow::into_stored)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(data, total, page))
    }

    async fn count(&self, scope: &TenantScope, filter: Filter) -> Result<i64> {
        let mut qb = build_count(E::COLLECTION, scope, &filter)?;
        let row: (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        update: Update,
    ) -> Result<Option<Stored<E>>> {
        let mut qb = build_update(E::COLLECTION, scope, id, &update)?;
        // rows_affected is 0 for matched-but-unchanged rows too, so existence comes from the re-read
        qb.build().execute(&self.pool).await?;
        ScopedRepository::<E>::find_by_id(self, scope, id).await
    }

    async fn update_one(
        &self,
        scope: &TenantScope,
        filter: Filter,
        update: Update,
    ) -> Result<Option<Stored<E>>> {
        match ScopedRepository::<E>::find_one(self, scope, filter).await? {
            Some(existing) => ScopedRepository::<E>::update(self, scope, existing.id, update).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, scope: &TenantScope, id: StringUuid) -> Result<bool> {
        ScopedRepository::<E>::delete_one(self, scope, Filter::new().eq(ID_FIELD, id)).await
    }

    async fn delete_one(&self, scope: &TenantScope, filter: Filter) -> Result<bool> {
        let mut qb = build_delete(E::COLLECTION, scope, &filter, true)?;
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, scope: &TenantScope, filter: Filter) -> Result<u64> {
        let mut qb = build_delete(E::COLLECTION, scope, &filter, false)?;
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn exists(&self, scope: &TenantScope, filter: Filter) -> Result<bool> {
        Ok(ScopedRepository::<E>::count(self, scope, filter).await? > 0)
    }
}
