//! Domain models and request payloads for the market service

pub mod photo;
pub mod product;
pub mod user;

pub use photo::{Photo, PhotoUpload};
pub use product::{NewProduct, Product, ProductState, StateChangeRequest, UploadForm};
pub use user::{Identity, User};
