use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three product categories the catalog understands.
///
/// The string tags ("book", "dvd", "furniture") are what the add-product
/// form submits and what the `Type` column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Book,
    Dvd,
    Furniture,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Book => "book",
            ProductType::Dvd => "dvd",
            ProductType::Furniture => "furniture",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(ProductType::Book),
            "dvd" => Ok(ProductType::Dvd),
            "furniture" => Ok(ProductType::Furniture),
            other => Err(UnknownProductType(other.to_string())),
        }
    }
}

/// A submitted `type` field that matches none of the known categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProductType(pub String);

impl fmt::Display for UnknownProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type not recognized: {:?}", self.0)
    }
}

impl std::error::Error for UnknownProductType {}

/// A value bound into an insert statement, matched positionally to a
/// column name. The `products` table only holds text and real columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Real(f64),
}

/// Attributes shared by every product variant. The identifier is assigned
/// by the storage layer on insert, so it does not appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

impl Product {
    /// Base insert columns, in the fixed order the storage layer binds
    /// them. Variant keys are appended after these.
    pub fn base_keys(&self) -> Vec<&'static str> {
        vec!["Sku", "Name", "Price", "Type"]
    }

    /// Base insert values, aligned 1:1 with `base_keys`.
    pub fn base_values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Text(self.sku.clone()),
            ColumnValue::Text(self.name.clone()),
            ColumnValue::Real(self.price),
            ColumnValue::Text(self.product_type.as_str().to_string()),
        ]
    }
}

/// Capability the storage layer inserts through: an ordered column list
/// plus the matching ordered values. Implementations must keep the two
/// lists the same length with positions corresponding 1:1; the storage
/// layer treats a mismatch as a contract violation.
pub trait Insertable {
    fn keys(&self) -> Vec<&'static str>;
    fn values(&self) -> Vec<ColumnValue>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookProduct {
    #[serde(flatten)]
    pub product: Product,
    pub weight: f64,
}

impl Insertable for BookProduct {
    fn keys(&self) -> Vec<&'static str> {
        let mut keys = self.product.base_keys();
        keys.push("Weight");
        keys
    }

    fn values(&self) -> Vec<ColumnValue> {
        let mut values = self.product.base_values();
        values.push(ColumnValue::Real(self.weight));
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DvdProduct {
    #[serde(flatten)]
    pub product: Product,
    pub size: f64,
}

impl Insertable for DvdProduct {
    fn keys(&self) -> Vec<&'static str> {
        let mut keys = self.product.base_keys();
        keys.push("Size");
        keys
    }

    fn values(&self) -> Vec<ColumnValue> {
        let mut values = self.product.base_values();
        values.push(ColumnValue::Real(self.size));
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureProduct {
    #[serde(flatten)]
    pub product: Product,
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl Insertable for FurnitureProduct {
    fn keys(&self) -> Vec<&'static str> {
        let mut keys = self.product.base_keys();
        keys.extend(["Width", "Length", "Height"]);
        keys
    }

    fn values(&self) -> Vec<ColumnValue> {
        let mut values = self.product.base_values();
        values.extend([
            ColumnValue::Real(self.width),
            ColumnValue::Real(self.length),
            ColumnValue::Real(self.height),
        ]);
        values
    }
}

/// A fully validated product awaiting insertion, one case per category.
#[derive(Debug, Clone, PartialEq)]
pub enum NewProduct {
    Book(BookProduct),
    Dvd(DvdProduct),
    Furniture(FurnitureProduct),
}

impl Insertable for NewProduct {
    fn keys(&self) -> Vec<&'static str> {
        match self {
            NewProduct::Book(p) => p.keys(),
            NewProduct::Dvd(p) => p.keys(),
            NewProduct::Furniture(p) => p.keys(),
        }
    }

    fn values(&self) -> Vec<ColumnValue> {
        match self {
            NewProduct::Book(p) => p.values(),
            NewProduct::Dvd(p) => p.values(),
            NewProduct::Furniture(p) => p.values(),
        }
    }
}

/// The flattened shape every stored row reads back as, regardless of
/// category: base attributes plus every variant column as an option.
///
/// Convention (not enforced by storage): exactly the columns relevant to
/// `product_type` are present, the rest are `None`. The tag is kept as the
/// raw string so rows with an unrecognized tag are still readable;
/// consumers decide how to treat them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub product_type: String,
    pub size: Option<f64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}
