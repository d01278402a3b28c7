//! # Seed Data Generator
//!
//! Populates the database with the sample catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./caixa.db)
//! cargo run -p caixa-db --bin seed
//!
//! # Specify database path
//! cargo run -p caixa-db --bin seed -- --db ./data/caixa.db
//! ```
//!
//! Seeding is destructive for the catalog: existing products are removed
//! first so repeated runs always produce the same six-product catalog.

use chrono::Utc;
use std::env;
use tracing::info;
use uuid::Uuid;

use caixa_core::Product;
use caixa_db::{Database, DbConfig};

/// The sample catalog: (barcode, name, description, category, price_cents, stock).
const SAMPLE_PRODUCTS: &[(&str, &str, &str, &str, i64, i64)] = &[
    (
        "7891234567890",
        "Coca-Cola 2L",
        "Refrigerante Coca-Cola 2 Litros",
        "Bebidas",
        850,
        50,
    ),
    (
        "7891234567891",
        "Pão Francês",
        "Pão francês unidade",
        "Padaria",
        50,
        100,
    ),
    (
        "7891234567892",
        "Arroz 5kg",
        "Arroz tipo 1 5kg",
        "Mercearia",
        2290,
        30,
    ),
    (
        "7891234567893",
        "Feijão 1kg",
        "Feijão carioca 1kg",
        "Mercearia",
        780,
        40,
    ),
    (
        "7891234567894",
        "Leite 1L",
        "Leite integral 1 litro",
        "Laticínios",
        420,
        60,
    ),
    (
        "7891234567895",
        "Açúcar 1kg",
        "Açúcar refinado 1kg",
        "Mercearia",
        390,
        25,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path();
    info!(path = %db_path, "Seeding sample catalog");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Fresh catalog on every run.
    sqlx::query("DELETE FROM products")
        .execute(db.pool())
        .await?;

    let products = db.products();
    let now = Utc::now();
    for &(barcode, name, description, category, price_cents, stock) in SAMPLE_PRODUCTS {
        products
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                barcode: barcode.to_string(),
                name: name.to_string(),
                description: Some(description.to_string()),
                category: Some(category.to_string()),
                price_cents,
                stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    let count = products.count().await?;
    info!(count, "Sample catalog seeded");

    db.close().await;
    Ok(())
}

/// Parses `--db <path>` from the command line; defaults to `./caixa.db`.
fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "./caixa.db".to_string())
}
