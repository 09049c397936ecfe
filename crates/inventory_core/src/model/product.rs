//! Product record, write-side field set, and field validation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable, storage-assigned identifier of a product row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ProductId = i64;

/// Columns of the `products` table.
///
/// Projections and sort orders are expressed with this closed set, so no
/// caller-supplied string ever reaches SQL identifier position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Name,
    Price,
    Quantity,
    Picture,
}

impl Column {
    /// All columns, in table order.
    pub const ALL: [Column; 5] = [
        Column::Id,
        Column::Name,
        Column::Price,
        Column::Quantity,
        Column::Picture,
    ];

    /// Column name as it appears in the schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Price => "price",
            Column::Quantity => "quantity",
            Column::Picture => "picture",
        }
    }
}

/// One persisted product row.
///
/// Columns outside the query projection come back as their zero values;
/// the picture blob is the one field where that distinction matters, so
/// it surfaces as `None` when not fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Whole-unit price. Never negative.
    pub price: i64,
    /// Units in stock. Never negative.
    pub quantity: i64,
    /// `None` only when the projection skipped the blob column.
    pub picture: Option<Vec<u8>>,
}

/// Write-side field set for insert and update operations.
///
/// Absent fields are left untouched by updates and fall back to schema
/// defaults on insert. Partial updates are legal; an all-absent set is a
/// documented zero-row no-op at the facade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductValues {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub picture: Option<Vec<u8>>,
}

impl ProductValues {
    /// An empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_picture(mut self, picture: Vec<u8>) -> Self {
        self.picture = Some(picture);
        self
    }

    /// Returns whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.picture.is_none()
    }

    /// Checks the invariants a new row must satisfy.
    ///
    /// `name` and `picture` must be present and non-empty; `price` and
    /// `quantity` may be absent (storage defaults them to 0) but must not
    /// be negative when present.
    pub fn validate_for_insert(&self) -> Result<(), ProductValidationError> {
        if self.name.is_none() {
            return Err(ProductValidationError::MissingName);
        }
        if self.picture.is_none() {
            return Err(ProductValidationError::MissingPicture);
        }
        self.validate_present_fields()
    }

    /// Checks the same per-field invariants, but only for present fields.
    ///
    /// An all-absent set is valid; the facade reports it as a zero-row
    /// no-op without touching storage.
    pub fn validate_for_update(&self) -> Result<(), ProductValidationError> {
        self.validate_present_fields()
    }

    fn validate_present_fields(&self) -> Result<(), ProductValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ProductValidationError::EmptyName);
            }
        }
        if let Some(price) = self.price {
            if price < 0 {
                return Err(ProductValidationError::NegativePrice(price));
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(ProductValidationError::NegativeQuantity(quantity));
            }
        }
        if let Some(picture) = &self.picture {
            if picture.is_empty() {
                return Err(ProductValidationError::EmptyPicture);
            }
        }
        Ok(())
    }
}

/// A write set violated a field invariant. No partial write occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    MissingName,
    EmptyName,
    NegativePrice(i64),
    NegativeQuantity(i64),
    MissingPicture,
    EmptyPicture,
}

impl ProductValidationError {
    /// The field whose invariant was violated.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName | Self::EmptyName => "name",
            Self::NegativePrice(_) => "price",
            Self::NegativeQuantity(_) => "quantity",
            Self::MissingPicture | Self::EmptyPicture => "picture",
        }
    }
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "product requires a name"),
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::NegativePrice(price) => {
                write!(f, "product price must not be negative, got {price}")
            }
            Self::NegativeQuantity(quantity) => {
                write!(f, "product quantity must not be negative, got {quantity}")
            }
            Self::MissingPicture => write!(f, "product requires a picture"),
            Self::EmptyPicture => write!(f, "product picture must not be empty"),
        }
    }
}

impl Error for ProductValidationError {}
