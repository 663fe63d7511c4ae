//! Market service routes

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartRejection},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    models::{Identity, PhotoUpload, Product, ProductState, StateChangeRequest, UploadForm, User},
    state::AppState,
};

/// Form field carrying photo files
const PHOTO_FIELD: &str = "Photo";

/// Create the router for the market service
pub fn create_router(state: AppState, upload_limit_bytes: usize) -> Router {
    let protected_routes = Router::new()
        .route("/upload", post(upload_product))
        .route("/product/:id", get(get_product))
        .route(
            "/product/:id/state",
            patch(change_product_state).post(change_product_state),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "market-service"
    }))
}

/// Create a product listing from a multipart form
///
/// Photos are stored one after the other before the product row is written.
/// A failure part way through leaves already stored photos in place.
pub async fn upload_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<&'static str> {
    info!("Received one upload request");

    let (form, uploads) = read_upload_form(multipart).await?;

    let qty = form
        .quantity()
        .map_err(|_| ApiError::bad_request("Quantity cannot be parsed into int"))?;

    let owner = resolve_user(&state, &identity)
        .await
        .ok_or_else(|| ApiError::bad_request("Couldn't find user"))?;

    let mut photos = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let photo = state
            .photo_store
            .store(owner.id, upload)
            .await
            .map_err(|e| {
                error!("Failed to save photo to storage: {}", e);
                ApiError::bad_request("Couldn't save photo to storage")
            })?;
        photos.push(photo);
    }

    let new_product = form.into_new_product(qty, &owner, &identity, photos);
    let product = state
        .product_store
        .insert(&new_product)
        .await
        .map_err(|e| {
            error!("Failed to save post to backend: {}", e);
            ApiError::InternalServerError
        })?;

    info!(
        "Product {} saved for user {} with {} photo(s)",
        product.id,
        owner.id,
        product.photos.len()
    );
    Ok("Post is saved successfully.")
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    info!("Received one item detail request");

    let id = parse_product_id(&id).ok_or_else(|| {
        error!("Failed to parse product id to uint: {:?}", id);
        ApiError::InternalServerError
    })?;

    let product = find_product(&state, id).await?;
    Ok(Json(product))
}

/// Change the sale state of a product. Only the seller may do this.
pub async fn change_product_state(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<&'static str> {
    let id =
        parse_product_id(&id).ok_or_else(|| ApiError::bad_request("Failed to parse product id"))?;

    let product = find_product(&state, id).await?;

    let caller = resolve_user(&state, &identity).await;
    if caller.map(|user| user.id) != Some(product.user_id) {
        return Err(ApiError::bad_request("No permission to do that"));
    }

    let request: StateChangeRequest = serde_json::from_slice(&body).map_err(|e| {
        info!("Rejected state change body: {}", e);
        ApiError::bad_request("Bad json")
    })?;

    let new_state = request
        .state
        .as_deref()
        .and_then(ProductState::settable)
        .ok_or_else(|| ApiError::bad_request("Not a valid state"))?;

    state
        .product_store
        .update_state(product.id, new_state)
        .await
        .map_err(|e| {
            error!("Failed to change state of product {}: {}", product.id, e);
            ApiError::InternalServerError
        })?;

    info!("Product {} is now {}", product.id, new_state);
    Ok("Successfully changed the state of product")
}

/// Read the whole upload form: text fields and `Photo` file parts in order
async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(UploadForm, Vec<PhotoUpload>)> {
    let mut multipart = multipart.map_err(|e| {
        info!("Rejected upload body: {}", e);
        ApiError::bad_request("Couldn't parse multipart form")
    })?;

    let mut form = UploadForm::default();
    let mut photos = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        info!("Malformed multipart form: {}", e);
        ApiError::bad_request("Couldn't parse multipart form")
    })? {
        let name = field.name().unwrap_or_default().to_string();
        // a file input left empty arrives as a part with an empty filename
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        if name == PHOTO_FIELD && file_name.is_some() {
            let content_type = field.content_type().map(str::to_owned);
            let data = field.bytes().await.map_err(|e| {
                info!("Failed to read photo part: {}", e);
                ApiError::bad_request("Image file is not available")
            })?;
            photos.push(PhotoUpload {
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                info!("Failed to read form field {}: {}", name, e);
                ApiError::bad_request("Couldn't parse multipart form")
            })?;
            form.insert(name, value);
        }
    }

    Ok((form, photos))
}

/// Resolve the caller to a registered user. Lookup errors count as unknown.
async fn resolve_user(state: &AppState, identity: &Identity) -> Option<User> {
    state
        .user_store
        .find_by_identity(identity)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to look up user {}: {}", identity.username, e);
            None
        })
}

async fn find_product(state: &AppState, id: u64) -> ApiResult<Product> {
    let not_found = || ApiError::bad_request("No such product");

    let id = i64::try_from(id).map_err(|_| not_found())?;
    state
        .product_store
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to look up product {}: {}", id, e);
            not_found()
        })?
        .ok_or_else(not_found)
}

/// Parse an unsigned id. `0x`, `0o` and `0b` prefixes select the base and a
/// bare leading `0` means octal.
fn parse_product_id(raw: &str) -> Option<u64> {
    let (digits, radix) = match raw.get(..2) {
        Some("0x" | "0X") => (&raw[2..], 16),
        Some("0o" | "0O") => (&raw[2..], 8),
        Some("0b" | "0B") => (&raw[2..], 2),
        _ if raw.len() > 1 && raw.starts_with('0') => (&raw[1..], 8),
        _ => (raw, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
