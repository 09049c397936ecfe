//! Access facade over the product store.
//!
//! # Responsibility
//! - Route resource identifiers to collection/row operations.
//! - Validate write sets before any SQL mutation.
//! - Raise change notifications after successful mutations.
//!
//! # Invariants
//! - This facade is the sole mutator of the `products` table; no other
//!   component opens a competing write connection.
//! - Single-item operations always rewrite the filter to the routed id
//!   and ignore caller-supplied filters.
//! - No notification fires for a mutation that affected zero rows.
//! - Each call is its own atomic unit; no multi-call transactions.

pub mod cursor;
pub mod observer;

use crate::db::{self, DbError};
use crate::model::product::{Column, ProductId, ProductValidationError, ProductValues};
use crate::router::{ResourceMatch, ResourceRouter, ResourceUri};
use cursor::ProductCursor;
use log::{error, info};
use observer::{ObserverRegistry, StaleFlag};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure surfaced by a facade operation. All of these are synchronous
/// hard failures; the facade never retries on its own.
#[derive(Debug)]
pub enum ProviderError {
    /// The identifier does not classify to a known route.
    UnsupportedResource(ResourceUri),
    /// A recognized identifier was used with a verb it does not support.
    UnsupportedOperation {
        uri: ResourceUri,
        operation: &'static str,
    },
    /// A write set violated a field invariant; nothing was written.
    Validation(ProductValidationError),
    Db(DbError),
    /// The engine reported no assigned id where one was expected.
    WriteFailed(ResourceUri),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedResource(uri) => {
                write!(f, "unsupported resource identifier `{uri}`")
            }
            Self::UnsupportedOperation { uri, operation } => {
                write!(f, "{operation} is not supported for `{uri}`")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteFailed(uri) => write!(f, "storage write failed for `{uri}`"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UnsupportedResource(_)
            | Self::UnsupportedOperation { .. }
            | Self::WriteFailed(_) => None,
        }
    }
}

impl From<ProductValidationError> for ProviderError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ProviderError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ProviderError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Descriptive type tag of a classified identifier. No side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    ProductList,
    ProductItem,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductList => "vnd.inventory.dir/products",
            Self::ProductItem => "vnd.inventory.item/products",
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied row filter: a WHERE fragment plus bound arguments.
///
/// The clause uses unnumbered `?` placeholders and may only reference
/// the `products` columns. Single-item operations ignore it entirely.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub clause: String,
    pub args: Vec<Value>,
}

impl Selection {
    pub fn new(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            clause: clause.into(),
            args,
        }
    }
}

/// Columns a query fetches.
///
/// `id` is always fetched so rows stay addressable; columns outside the
/// projection come back as their zero values (`picture` as `None`). List
/// views typically skip the blob:
/// `Projection::Columns(vec![Column::Name, Column::Price, Column::Quantity])`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    Full,
    Columns(Vec<Column>),
}

impl Projection {
    fn resolve(&self) -> Vec<Column> {
        match self {
            Projection::Full => Column::ALL.to_vec(),
            Projection::Columns(columns) => {
                let mut resolved = vec![Column::Id];
                for &column in columns {
                    if !resolved.contains(&column) {
                        resolved.push(column);
                    }
                }
                resolved
            }
        }
    }
}

/// Row ordering for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub descending: bool,
}

impl SortOrder {
    pub fn ascending(column: Column) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn descending(column: Column) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

/// Single entry point to the product store.
///
/// Owns the one live connection for the process and the observer
/// registry handed in at construction. Stateless across calls beyond
/// those two; all per-call state is local to the call.
pub struct ProductProvider {
    conn: Connection,
    router: ResourceRouter,
    observers: Arc<ObserverRegistry>,
}

impl ProductProvider {
    /// Opens the file-backed store, creating it on first use.
    pub fn open(
        path: impl AsRef<Path>,
        observers: Arc<ObserverRegistry>,
    ) -> ProviderResult<Self> {
        Ok(Self::with_connection(db::open_db(path)?, observers))
    }

    /// Opens an in-memory store; used by tests and ephemeral embeddings.
    pub fn open_in_memory(observers: Arc<ObserverRegistry>) -> ProviderResult<Self> {
        Ok(Self::with_connection(db::open_db_in_memory()?, observers))
    }

    /// Wraps an already-bootstrapped connection.
    pub fn with_connection(conn: Connection, observers: Arc<ObserverRegistry>) -> Self {
        Self {
            conn,
            router: ResourceRouter::new(),
            observers,
        }
    }

    /// The registry this facade raises change notifications on.
    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    /// Queries the rows behind `uri`.
    ///
    /// Single-item identifiers force the filter to the routed id; any
    /// caller-supplied filter is ignored for them. The returned cursor
    /// watches `uri` and goes stale when a later mutation touches it.
    pub fn query(
        &self,
        uri: &ResourceUri,
        projection: &Projection,
        filter: Option<&Selection>,
        sort: Option<SortOrder>,
    ) -> ProviderResult<ProductCursor<'_>> {
        let (clause, args) = match self.router.classify(uri) {
            ResourceMatch::Collection => filter
                .map(|selection| (selection.clause.clone(), selection.args.clone()))
                .unwrap_or_default(),
            ResourceMatch::SingleItem(id) => row_filter(id),
            ResourceMatch::Unrecognized => {
                return Err(ProviderError::UnsupportedResource(uri.clone()));
            }
        };

        let columns = projection.resolve();
        let column_list = columns
            .iter()
            .map(|column| column.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {column_list} FROM products");
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        if let Some(order) = sort {
            sql.push_str(" ORDER BY ");
            sql.push_str(order.column.as_str());
            sql.push_str(if order.descending { " DESC" } else { " ASC" });
        }

        let stale = Arc::new(StaleFlag::default());
        self.observers.register(uri.clone(), &stale);
        Ok(ProductCursor::new(&self.conn, sql, args, columns, stale))
    }

    /// Inserts one product and returns its assigned id.
    ///
    /// Only the collection identifier accepts inserts; inserting "into" a
    /// single-item identifier is never valid. On success a change
    /// notification fires for the collection identifier.
    pub fn insert(&self, uri: &ResourceUri, values: &ProductValues) -> ProviderResult<ProductId> {
        match self.router.classify(uri) {
            ResourceMatch::Collection => {}
            ResourceMatch::SingleItem(_) => {
                return Err(ProviderError::UnsupportedOperation {
                    uri: uri.clone(),
                    operation: "insert",
                });
            }
            ResourceMatch::Unrecognized => {
                return Err(ProviderError::UnsupportedResource(uri.clone()));
            }
        }
        values.validate_for_insert()?;

        let started_at = Instant::now();
        let (columns, args) = present_fields(values);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO products ({}) VALUES ({placeholders})",
            columns.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(args))?;

        let id = self.conn.last_insert_rowid();
        if id <= 0 {
            error!("event=insert module=provider status=error uri={uri} error_code=no_rowid");
            return Err(ProviderError::WriteFailed(uri.clone()));
        }

        self.observers.notify_change(uri);
        info!(
            "event=insert module=provider status=ok uri={uri} id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    /// Updates the rows behind `uri` with the present fields of `values`.
    ///
    /// An empty field set returns 0 without touching storage. Returns the
    /// count of rows actually changed and notifies observers of `uri`
    /// only when that count is nonzero.
    pub fn update(
        &self,
        uri: &ResourceUri,
        values: &ProductValues,
        filter: Option<&Selection>,
    ) -> ProviderResult<usize> {
        let (clause, where_args) = self.mutation_filter(uri, filter)?;
        values.validate_for_update()?;
        if values.is_empty() {
            return Ok(0);
        }

        let started_at = Instant::now();
        let (columns, mut args) = present_fields(values);
        let assignments = columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE products SET {assignments}");
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        args.extend(where_args);

        let affected = self.conn.execute(&sql, params_from_iter(args))?;
        if affected > 0 {
            self.observers.notify_change(uri);
        }
        info!(
            "event=update module=provider status=ok uri={uri} rows={affected} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(affected)
    }

    /// Deletes the rows behind `uri`.
    ///
    /// For the collection, every row matching the filter goes; an empty
    /// filter deletes all rows. Deleting an already-absent row returns 0,
    /// not an error. Notifies observers of `uri` only when at least one
    /// row was removed.
    pub fn delete(&self, uri: &ResourceUri, filter: Option<&Selection>) -> ProviderResult<usize> {
        let (clause, args) = self.mutation_filter(uri, filter)?;

        let started_at = Instant::now();
        let mut sql = String::from("DELETE FROM products");
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        let affected = self.conn.execute(&sql, params_from_iter(args))?;
        if affected > 0 {
            self.observers.notify_change(uri);
        }
        info!(
            "event=delete module=provider status=ok uri={uri} rows={affected} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(affected)
    }

    /// Descriptive type tag for `uri`. Purely informational.
    pub fn resource_type(&self, uri: &ResourceUri) -> ProviderResult<ResourceType> {
        match self.router.classify(uri) {
            ResourceMatch::Collection => Ok(ResourceType::ProductList),
            ResourceMatch::SingleItem(_) => Ok(ResourceType::ProductItem),
            ResourceMatch::Unrecognized => Err(ProviderError::UnsupportedResource(uri.clone())),
        }
    }

    /// Shared filter resolution for update/delete.
    fn mutation_filter(
        &self,
        uri: &ResourceUri,
        filter: Option<&Selection>,
    ) -> ProviderResult<(String, Vec<Value>)> {
        match self.router.classify(uri) {
            ResourceMatch::Collection => Ok(filter
                .map(|selection| (selection.clause.clone(), selection.args.clone()))
                .unwrap_or_default()),
            ResourceMatch::SingleItem(id) => Ok(row_filter(id)),
            ResourceMatch::Unrecognized => Err(ProviderError::UnsupportedResource(uri.clone())),
        }
    }
}

fn row_filter(id: ProductId) -> (String, Vec<Value>) {
    ("id = ?".to_string(), vec![Value::Integer(id)])
}

/// Present fields of a write set, as column names and bound values.
fn present_fields(values: &ProductValues) -> (Vec<&'static str>, Vec<Value>) {
    let mut columns = Vec::new();
    let mut args = Vec::new();
    if let Some(name) = &values.name {
        columns.push(Column::Name.as_str());
        args.push(Value::Text(name.clone()));
    }
    if let Some(price) = values.price {
        columns.push(Column::Price.as_str());
        args.push(Value::Integer(price));
    }
    if let Some(quantity) = values.quantity {
        columns.push(Column::Quantity.as_str());
        args.push(Value::Integer(quantity));
    }
    if let Some(picture) = &values.picture {
        columns.push(Column::Picture.as_str());
        args.push(Value::Blob(picture.clone()));
    }
    (columns, args)
}
