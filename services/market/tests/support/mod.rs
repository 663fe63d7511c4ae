//! In-memory stores and request helpers for driving the router in tests
#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use tower::ServiceExt;

use market::{
    AppState, create_router,
    middleware::{Claims, JwtConfig, JwtVerifier},
    models::{Identity, NewProduct, Photo, PhotoUpload, Product, ProductState, User},
    repositories::{ProductStore, UserStore},
    storage::{PhotoStore, object_key},
};

pub const SECRET: &str = "market-test-secret";
pub const BOUNDARY: &str = "X-MARKET-TEST-BOUNDARY";
pub const UPLOAD_LIMIT: usize = 10 << 20;

pub struct InMemoryUsers {
    users: Vec<User>,
    fail: AtomicBool,
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<User>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("user store unavailable");
        }
        Ok(self
            .users
            .iter()
            .find(|u| {
                u.email == identity.email
                    && u.university == identity.university
                    && u.username == identity.username
                    && u.phone == identity.phone
            })
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryProducts {
    products: Mutex<Vec<Product>>,
    fail_writes: AtomicBool,
}

impl InMemoryProducts {
    pub fn seed(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    pub fn get(&self, id: i64) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for InMemoryProducts {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.get(id))
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("insert failed");
        }
        let mut products = self.products.lock().unwrap();
        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let stored = Product {
            id,
            product_name: product.product_name.clone(),
            price: product.price.clone(),
            description: product.description.clone(),
            university: product.university.clone(),
            condition: product.condition.clone(),
            qty: product.qty,
            state: product.state,
            user_id: product.user_id,
            photos: product.photos.clone(),
            created_at: now,
            updated_at: now,
        };
        products.push(stored.clone());
        Ok(stored)
    }

    async fn update_state(&self, id: i64, state: ProductState) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("update failed");
        }
        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.state = state;
                product.updated_at = Utc::now();
                Ok(())
            }
            None => bail!("product {id} does not exist"),
        }
    }
}

/// Photo store that keeps objects in memory and can fail on the n-th upload
#[derive(Default)]
pub struct InMemoryPhotos {
    objects: Mutex<Vec<(Photo, Bytes)>>,
    calls: AtomicUsize,
    fail_on_call: Mutex<Option<usize>>,
}

impl InMemoryPhotos {
    /// Fail the upload with this zero-based call index
    pub fn fail_on_call(&self, call: usize) {
        *self.fail_on_call.lock().unwrap() = Some(call);
    }

    pub fn stored(&self) -> Vec<(Photo, Bytes)> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotos {
    async fn store(&self, owner: i64, upload: PhotoUpload) -> Result<Photo> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on_call.lock().unwrap() == Some(call) {
            bail!("object storage unavailable");
        }
        let object = object_key("products", owner, &upload);
        let photo = Photo {
            bucket: "test-bucket".to_string(),
            url: format!("https://cdn.test/{}", object),
            object,
            content_type: upload.content_type().to_string(),
            size: upload.size(),
        };
        self.objects
            .lock()
            .unwrap()
            .push((photo.clone(), upload.data));
        Ok(photo)
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub products: Arc<InMemoryProducts>,
    pub photos: Arc<InMemoryPhotos>,
}

pub fn alice() -> User {
    User {
        id: 7,
        email: "alice@state.edu".to_string(),
        university: "State University".to_string(),
        phone: "555-0100".to_string(),
        username: "alice".to_string(),
    }
}

pub fn bob() -> User {
    User {
        id: 8,
        email: "bob@state.edu".to_string(),
        university: "State University".to_string(),
        phone: "555-0199".to_string(),
        username: "bob".to_string(),
    }
}

pub fn identity_of(user: &User) -> Identity {
    Identity {
        email: user.email.clone(),
        university: user.university.clone(),
        phone: user.phone.clone(),
        username: user.username.clone(),
    }
}

pub fn stranger() -> Identity {
    Identity {
        email: "mallory@elsewhere.edu".to_string(),
        university: "Elsewhere".to_string(),
        phone: "555-0666".to_string(),
        username: "mallory".to_string(),
    }
}

pub fn product(id: i64, owner: &User, state: ProductState) -> Product {
    let now = Utc::now();
    Product {
        id,
        product_name: "Lamp".to_string(),
        price: "15".to_string(),
        description: "Desk lamp".to_string(),
        university: owner.university.clone(),
        condition: "Like new".to_string(),
        qty: 1,
        state,
        user_id: owner.id,
        photos: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUsers {
            users: vec![alice(), bob()],
            fail: AtomicBool::new(false),
        });
        let products = Arc::new(InMemoryProducts::default());
        let photos = Arc::new(InMemoryPhotos::default());

        let state = AppState {
            user_store: users.clone(),
            product_store: products.clone(),
            photo_store: photos.clone(),
            jwt_verifier: JwtVerifier::new(&JwtConfig::Secret(SECRET.to_string()))
                .expect("verifier"),
        };

        Self {
            router: create_router(state, UPLOAD_LIMIT),
            users,
            products,
            photos,
        }
    }

    pub fn fail_user_lookups(&self) {
        self.users.fail.store(true, Ordering::SeqCst);
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Response<Body>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        (response.status(), response)
    }
}

pub fn token_for(identity: &Identity) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 600;
    let claims = Claims {
        email: identity.email.clone(),
        university: identity.university.clone(),
        phone: identity.phone.clone(),
        username: identity.username.clone(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token")
}

pub fn bearer(identity: &Identity) -> String {
    format!("Bearer {}", token_for(identity))
}

/// A file part of a multipart form
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(identity: &Identity, body: Vec<u8>) -> Request<Body> {
    Request::post("/upload")
        .header(header::AUTHORIZATION, bearer(identity))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn state_request(identity: &Identity, id: &str, body: &str) -> Request<Body> {
    Request::patch(format!("/product/{id}/state"))
        .header(header::AUTHORIZATION, bearer(identity))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn detail_request(identity: &Identity, id: &str) -> Request<Body> {
    Request::get(format!("/product/{id}"))
        .header(header::AUTHORIZATION, bearer(identity))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
