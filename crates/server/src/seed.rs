//! Demo dataset seeding.
//!
//! Fills an empty database with a fixed storefront: five categories, five
//! products each, eight services, two hundred customers, three admins and
//! 150 orders drawn from a deterministic RNG. A database that already has
//! categories is left alone, so startup seeding is idempotent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;
use thiserror::Error;

use evergreen_core::{OrderStatus, UserId, UserRole};

use crate::db::catalog::{CatalogRepository, NewProduct};
use crate::db::users::{NewUser, UserRepository};
use crate::db::{RepositoryError, orders};
use crate::models::catalog::Service;
use crate::services::auth::hash_password;

const MEDIA_BASE_URL: &str = "/static/media";
const RNG_SEED: u64 = 42;

/// Errors from seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to hash a demo password")]
    PasswordHash,
}

/// slug, title, description
const CATEGORIES: [(&str, &str, &str); 5] = [
    (
        "smart-home",
        "Smart Home",
        "Controllers, sensors and lighting for efficient homes.",
    ),
    (
        "eco-transport",
        "Eco Transport",
        "Urban bikes, scooters and compact mobility gear.",
    ),
    (
        "water-care",
        "Water Care",
        "Purifiers, filters and water quality diagnostics.",
    ),
    (
        "zero-waste",
        "Zero Waste",
        "Reusable accessories, packaging and kitchen kits.",
    ),
    (
        "urban-farming",
        "Urban Farming",
        "Indoor gardens, grow-lights and hydroponic kits.",
    ),
];

/// id, title, description, price, status, category slug, image file
const SERVICES: [(&str, &str, &str, f64, &str, Option<&str>, &str); 8] = [
    (
        "install-smart-home",
        "Smart Home Installation",
        "On-site engineer visit, scenario planning, gateway and sensor setup.",
        14990.0,
        "in_progress",
        Some("smart-home"),
        "install_smart_home.jpg",
    ),
    (
        "eco-audit",
        "Apartment Eco Audit",
        "Energy and water usage diagnostics with savings recommendations.",
        12990.0,
        "new",
        Some("smart-home"),
        "eco_audit.jpg",
    ),
    (
        "bike-service",
        "Urban Vehicle Service",
        "E-bike and scooter tuning, battery diagnostics.",
        7990.0,
        "new",
        Some("eco-transport"),
        "bike_service.jpg",
    ),
    (
        "water-lab",
        "Water Lab",
        "Sampling, composition analysis and filter selection for home or office.",
        9990.0,
        "new",
        Some("water-care"),
        "water_lab.jpg",
    ),
    (
        "urban-garden",
        "Turnkey Urban Garden",
        "Hydroponic system design, lighting and maintenance onboarding.",
        18990.0,
        "in_progress",
        Some("urban-farming"),
        "urban_garden.jpg",
    ),
    (
        "zero-waste-kit",
        "Zero-Waste Rollout",
        "Moving a cafe or office to reusable packaging and waste sorting.",
        15990.0,
        "new",
        Some("zero-waste"),
        "zero_waste.jpg",
    ),
    (
        "smart-training",
        "Staff Training",
        "Corporate sessions on energy saving and sustainable habits.",
        5590.0,
        "completed",
        Some("smart-home"),
        "training.jpg",
    ),
    (
        "rapid-support",
        "Rapid Engineer Dispatch",
        "24/7 support for business clients, smart system recovery.",
        11990.0,
        "in_progress",
        Some("smart-home"),
        "rapid_support.jpg",
    ),
];

fn base_specs(index: usize) -> Vec<(&'static str, &'static str)> {
    const SPECS: [&[(&str, &str)]; 5] = [
        &[("Power", "USB-C"), ("Warranty", "24 months")],
        &[("Material", "Aluminium"), ("Warranty", "12 months")],
        &[("Memory", "64 MB"), ("Display", "LED")],
        &[("Certification", "CE/FCC"), ("Compatible", "iOS/Android")],
        &[("Edition", "2025"), ("Manufacturer", "Evergreen")],
    ];
    SPECS[index % SPECS.len()].to_vec()
}

/// Seed the demo dataset. Returns `false` when data already exists.
///
/// # Errors
///
/// Returns `SeedError` if any insert fails or password hashing breaks.
pub async fn run(pool: &SqlitePool) -> Result<bool, SeedError> {
    let catalog = CatalogRepository::new(pool);
    if catalog.count_categories().await? > 0 {
        return Ok(false);
    }

    tracing::info!("seeding demo dataset");

    // Categories and their products.
    let mut products: Vec<(String, f64)> = Vec::with_capacity(25);
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (slug, title, description) in CATEGORIES {
        let file_slug = slug.replace('-', "_");
        let hero_image = format!("{MEDIA_BASE_URL}/categories/{file_slug}.png");
        let category = catalog
            .insert_category(slug, title, description, &hero_image)
            .await?;
        category_ids.push((slug, category.id));

        for index in 0..5 {
            let product_id = format!("{file_slug}_{}", index + 1);
            #[allow(clippy::cast_precision_loss)]
            let price = 1990.0 + (index as f64) * 1500.0;
            catalog
                .insert_product(NewProduct {
                    id: product_id.clone(),
                    category_id: category.id,
                    title: format!("{title} {}", index + 1),
                    description: format!("{description} Edition #{}.", index + 1),
                    price,
                    image_urls: vec![format!(
                        "{MEDIA_BASE_URL}/products/{file_slug}_{}.png",
                        index + 1
                    )],
                    characteristics: base_specs(index)
                        .into_iter()
                        .map(|(k, v)| (k.to_owned(), v.to_owned()))
                        .collect(),
                })
                .await?;
            products.push((product_id, price));
        }
    }

    // Services.
    for (id, title, description, price, status, category_slug, image) in SERVICES {
        let category_id = category_slug.and_then(|slug| {
            category_ids
                .iter()
                .find(|(s, _)| *s == slug)
                .map(|(_, id)| *id)
        });
        catalog
            .insert_service(&Service {
                id: id.to_owned(),
                category_id,
                title: title.to_owned(),
                description: description.to_owned(),
                price,
                status: status.to_owned(),
                image_url: format!("{MEDIA_BASE_URL}/services/{image}"),
                created: chrono::Utc::now(),
                updated: chrono::Utc::now(),
                is_deleted: false,
            })
            .await?;
    }

    // Accounts. The four distinct demo passwords are hashed once each.
    let users = UserRepository::new(pool);
    let user_hash = hash_password("user").map_err(|_| SeedError::PasswordHash)?;
    let userpass_hash = hash_password("userpass").map_err(|_| SeedError::PasswordHash)?;
    let admin_hash = hash_password("admin").map_err(|_| SeedError::PasswordHash)?;
    let adminpass_hash = hash_password("adminpass").map_err(|_| SeedError::PasswordHash)?;

    let mut customers: Vec<UserId> = Vec::with_capacity(200);
    let demo = users
        .create(NewUser {
            username: "user".to_owned(),
            full_name: "Demo User".to_owned(),
            email: "user@evergreen.shop".to_owned(),
            password_hash: user_hash,
            role: UserRole::Customer,
            phone: "+7 900 100-0000".to_owned(),
            address: "Ekaterinburg".to_owned(),
        })
        .await?;
    customers.push(demo.id);

    for index in 1..200 {
        let username = format!("user{index:03}");
        let customer = users
            .create(NewUser {
                username: username.clone(),
                full_name: format!("Eco User {index:03}"),
                email: format!("{username}@evergreen.shop"),
                password_hash: userpass_hash.clone(),
                role: UserRole::Customer,
                phone: format!("+7 900 100-{index:04}"),
                address: "Ekaterinburg".to_owned(),
            })
            .await?;
        customers.push(customer.id);
    }

    let admin_accounts = [("admin", admin_hash), ("admin1", adminpass_hash.clone()), ("admin2", adminpass_hash)];
    for (index, (username, hash)) in admin_accounts.into_iter().enumerate() {
        users
            .create(NewUser {
                username: username.to_owned(),
                full_name: format!("Admin {}", index + 1),
                email: format!("{username}@evergreen.shop"),
                password_hash: hash,
                role: UserRole::Admin,
                phone: format!("+7 900 200-{:04}", index + 1),
                address: "HQ office".to_owned(),
            })
            .await?;
    }

    // Orders, deterministic across runs.
    let statuses = [
        OrderStatus::New,
        OrderStatus::InProgress,
        OrderStatus::Completed,
    ];
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let mut tx = pool.begin().await.map_err(RepositoryError::Database)?;

    for index in 1..=150 {
        let order_id = format!("ORD-{}", 5800 + index);
        let buyer = customers[rng.random_range(0..customers.len())];
        let status = statuses[rng.random_range(0..statuses.len())];
        orders::insert_order(&mut *tx, &order_id, buyer, status).await?;

        let mut total_sum = 0.0;
        for _ in 0..rng.random_range(1..=3) {
            let (product_id, price) = &products[rng.random_range(0..products.len())];
            let quantity: i64 = rng.random_range(1..=3);
            #[allow(clippy::cast_precision_loss)]
            let line_total = price * quantity as f64;
            total_sum += line_total;
            orders::insert_order_item(&mut *tx, &order_id, product_id, quantity, *price).await?;
        }
        orders::set_order_total(&mut *tx, &order_id, total_sum).await?;
    }

    tx.commit().await.map_err(RepositoryError::Database)?;
    tracing::info!("demo dataset seeded");
    Ok(true)
}
