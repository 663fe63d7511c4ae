//! User and caller identity models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registered marketplace user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "University")]
    pub university: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "UserName")]
    pub username: String,
}

/// Identity of the authenticated caller.
///
/// Built once by the auth middleware from verified token claims and passed to
/// handlers through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub university: String,
    pub phone: String,
    pub username: String,
}
