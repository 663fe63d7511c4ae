//! Product listing model, sale state and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

use super::{Identity, Photo, User};

/// Sale state of a product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductState {
    #[serde(rename = "for sale")]
    ForSale,
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "pending")]
    Pending,
}

impl ProductState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductState::ForSale => "for sale",
            ProductState::Hidden => "hidden",
            ProductState::Pending => "pending",
        }
    }

    /// Parse a state requested by a seller.
    ///
    /// Only `for sale` and `hidden` can be set this way; `pending` belongs to
    /// the purchase flow.
    pub fn settable(value: &str) -> Option<Self> {
        match value {
            "for sale" => Some(ProductState::ForSale),
            "hidden" => Some(ProductState::Hidden),
            _ => None,
        }
    }
}

impl fmt::Display for ProductState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored state string that matches no known state
#[derive(Debug, Error)]
#[error("unknown product state: {0:?}")]
pub struct UnknownState(pub String);

impl FromStr for ProductState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "for sale" => Ok(ProductState::ForSale),
            "hidden" => Ok(ProductState::Hidden),
            "pending" => Ok(ProductState::Pending),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "University")]
    pub university: String,
    #[serde(rename = "Condition")]
    pub condition: String,
    #[serde(rename = "Qty")]
    pub qty: i64,
    #[serde(rename = "State")]
    pub state: ProductState,
    #[serde(rename = "UserId")]
    pub user_id: i64,
    #[serde(rename = "Photos")]
    pub photos: Vec<Photo>,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable product, before the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub product_name: String,
    pub price: String,
    pub description: String,
    pub university: String,
    pub condition: String,
    pub qty: i64,
    pub state: ProductState,
    pub user_id: i64,
    pub photos: Vec<Photo>,
}

/// Text fields of a product upload form
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Record a field value. Repeated fields keep their first value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Value of a field, empty when the field was not submitted
    pub fn value(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn quantity(&self) -> Result<i64, ParseIntError> {
        self.value("Qty").parse()
    }

    /// Build the listing for `owner`. New listings always start `for sale` and
    /// take their university from the caller's identity.
    pub fn into_new_product(
        self,
        qty: i64,
        owner: &User,
        identity: &Identity,
        photos: Vec<Photo>,
    ) -> NewProduct {
        NewProduct {
            product_name: self.value("ProductName").to_string(),
            price: self.value("Price").to_string(),
            description: self.value("Description").to_string(),
            university: identity.university.clone(),
            condition: self.value("Condition").to_string(),
            qty,
            state: ProductState::ForSale,
            user_id: owner.id,
            photos,
        }
    }
}

/// Body of a state change request.
///
/// Only the target state is read; any other field in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateChangeRequest {
    #[serde(rename = "State", default)]
    pub state: Option<String>,
}
