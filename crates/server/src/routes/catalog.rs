//! Public catalog reads and admin catalog writes.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer};

use evergreen_core::normalize_slug;

use crate::db::catalog::{CatalogRepository, NewProduct, ServicePatch};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::catalog::Service;
use crate::routes::views::{CategoryOut, ProductOut, ServiceOut};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product))
        .route("/services", get(list_services).post(create_service))
        .route("/services/{id}", patch(update_service))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryOut>>> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct ProductsQuery {
    category: Option<String>,
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<ProductOut>>> {
    let slug = query.category.as_deref().map(normalize_slug);
    let products = CatalogRepository::new(state.pool())
        .list_products(slug.as_deref())
        .await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductOut>> {
    let product = CatalogRepository::new(state.pool())
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;
    Ok(Json(product.into()))
}

#[derive(Debug, Deserialize)]
struct ProductCreateRequest {
    id: String,
    title: String,
    description: String,
    category_id: String,
    price: f64,
    #[serde(default)]
    image_urls: Vec<String>,
    #[serde(default)]
    specs: HashMap<String, String>,
}

async fn create_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ProductCreateRequest>,
) -> Result<(StatusCode, Json<ProductOut>)> {
    let catalog = CatalogRepository::new(state.pool());

    let category = catalog
        .get_category_by_slug(&normalize_slug(&body.category_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_owned()))?;

    let product = catalog
        .insert_product(NewProduct {
            id: body.id,
            category_id: category.id,
            title: body.title,
            description: body.description,
            price: body.price,
            image_urls: body.image_urls,
            characteristics: body.specs,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<ServiceOut>>> {
    let services = CatalogRepository::new(state.pool()).list_services().await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct ServiceCreateRequest {
    id: String,
    title: String,
    description: String,
    price: f64,
    #[serde(default = "default_service_status")]
    status: String,
    category_id: Option<String>,
    #[serde(default)]
    image_url: String,
}

fn default_service_status() -> String {
    "active".to_owned()
}

async fn create_service(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ServiceCreateRequest>,
) -> Result<(StatusCode, Json<ServiceOut>)> {
    let catalog = CatalogRepository::new(state.pool());

    // An unknown category slug leaves the service uncategorized.
    let category_id = match body.category_id {
        Some(slug) => catalog
            .get_category_by_slug(&normalize_slug(&slug))
            .await?
            .map(|category| category.id),
        None => None,
    };

    let service = Service {
        id: body.id,
        category_id,
        title: body.title,
        description: body.description,
        price: body.price,
        status: body.status,
        image_url: body.image_url,
        created: chrono::Utc::now(),
        updated: chrono::Utc::now(),
        is_deleted: false,
    };
    catalog.insert_service(&service).await?;

    let stored = catalog
        .get_service(&service.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service".to_owned()))?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}

#[derive(Debug, Deserialize)]
struct ServiceUpdateRequest {
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    status: Option<String>,
    // Double option: absent leaves the category untouched, explicit null
    // (or an unknown slug) clears it.
    #[serde(default, deserialize_with = "double_option")]
    category_id: Option<Option<String>>,
    image_url: Option<String>,
}

fn double_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

async fn update_service(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ServiceUpdateRequest>,
) -> Result<Json<ServiceOut>> {
    let catalog = CatalogRepository::new(state.pool());

    let category_id = match body.category_id {
        Some(Some(slug)) => Some(
            catalog
                .get_category_by_slug(&normalize_slug(&slug))
                .await?
                .map(|category| category.id),
        ),
        Some(None) => Some(None),
        None => None,
    };

    let service = catalog
        .update_service(
            &id,
            ServicePatch {
                title: body.title,
                description: body.description,
                price: body.price,
                status: body.status,
                category_id,
                image_url: body.image_url,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("Service".to_owned()),
            other => AppError::Repository(other),
        })?;

    Ok(Json(service.into()))
}
