//! Query result cursor.
//!
//! A cursor is a lazy, re-iterable view over one query: rows are fetched
//! on first access, iteration is positional, and `refresh` re-runs the
//! statement after a change notification marked the view stale. It is not
//! a one-shot list; the list screen of an embedding UI keeps one alive
//! and refreshes it when signaled.

use crate::model::product::{Column, Product};
use crate::provider::observer::StaleFlag;
use crate::provider::ProviderResult;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::sync::Arc;

pub struct ProductCursor<'conn> {
    conn: &'conn Connection,
    sql: String,
    args: Vec<Value>,
    columns: Vec<Column>,
    rows: Option<Vec<Product>>,
    position: usize,
    stale: Arc<StaleFlag>,
}

impl<'conn> ProductCursor<'conn> {
    pub(crate) fn new(
        conn: &'conn Connection,
        sql: String,
        args: Vec<Value>,
        columns: Vec<Column>,
        stale: Arc<StaleFlag>,
    ) -> Self {
        Self {
            conn,
            sql,
            args,
            columns,
            rows: None,
            position: 0,
            stale,
        }
    }

    /// Returns the next row, or `None` once the view is exhausted.
    ///
    /// The first call fetches the snapshot; later calls only advance the
    /// position.
    pub fn next(&mut self) -> ProviderResult<Option<Product>> {
        self.ensure_loaded()?;
        let rows = self.rows.as_deref().unwrap_or_default();
        if self.position >= rows.len() {
            return Ok(None);
        }
        let product = rows[self.position].clone();
        self.position += 1;
        Ok(Some(product))
    }

    /// Restarts iteration over the current snapshot.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Number of rows in the view, forcing the fetch if needed.
    pub fn count(&mut self) -> ProviderResult<usize> {
        self.ensure_loaded()?;
        Ok(self.rows.as_deref().unwrap_or_default().len())
    }

    /// Re-runs the query, resets the position, and clears the stale flag.
    pub fn refresh(&mut self) -> ProviderResult<()> {
        self.rows = Some(self.fetch()?);
        self.position = 0;
        self.stale.clear();
        Ok(())
    }

    /// Whether a change notification for the watched identifier has fired
    /// since the last fetch or refresh.
    pub fn is_stale(&self) -> bool {
        self.stale.is_set()
    }

    fn ensure_loaded(&mut self) -> ProviderResult<()> {
        if self.rows.is_none() {
            self.rows = Some(self.fetch()?);
            self.stale.clear();
        }
        Ok(())
    }

    fn fetch(&self) -> ProviderResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(&self.sql)?;
        let mut rows = stmt.query(params_from_iter(self.args.iter().cloned()))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row, &self.columns)?);
        }
        Ok(products)
    }
}

fn parse_product_row(row: &Row<'_>, columns: &[Column]) -> Result<Product, rusqlite::Error> {
    let mut product = Product {
        id: 0,
        name: String::new(),
        price: 0,
        quantity: 0,
        picture: None,
    };
    for (index, column) in columns.iter().enumerate() {
        match column {
            Column::Id => product.id = row.get(index)?,
            Column::Name => product.name = row.get(index)?,
            Column::Price => product.price = row.get(index)?,
            Column::Quantity => product.quantity = row.get(index)?,
            Column::Picture => product.picture = Some(row.get(index)?),
        }
    }
    Ok(product)
}
