//! # Seed Data Generator
//!
//! Populates the database with demo clients and products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p counter-db --bin seed
//!
//! # Specify database path
//! cargo run -p counter-db --bin seed -- --db ./data/counter.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;

use counter_core::{Client, Product};
use counter_db::{Database, DbConfig};

/// Demo catalog: (name, category, unit, price cents, stock, min stock).
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("Rice 5kg", "Grocery", "un", 2199, 40, 10),
    ("Black Beans 1kg", "Grocery", "un", 899, 60, 15),
    ("Wheat Flour 1kg", "Grocery", "un", 549, 35, 10),
    ("Sugar 2kg", "Grocery", "un", 749, 30, 8),
    ("Salt 1kg", "Grocery", "un", 299, 25, 5),
    ("Soybean Oil 900ml", "Grocery", "un", 789, 48, 12),
    ("Spaghetti 500g", "Grocery", "un", 449, 55, 12),
    ("Ground Coffee 500g", "Beverages", "un", 1599, 24, 6),
    ("Whole Milk 1L", "Dairy", "un", 519, 72, 24),
    ("Butter 200g", "Dairy", "un", 1099, 18, 6),
    ("Mozzarella", "Dairy", "kg", 3999, 12, 4),
    ("Cola 2L", "Beverages", "un", 899, 36, 12),
    ("Orange Juice 1L", "Beverages", "un", 1149, 20, 8),
    ("Mineral Water 500ml", "Beverages", "un", 249, 96, 24),
    ("Laundry Soap 1kg", "Cleaning", "un", 1299, 22, 6),
    ("Bleach 1L", "Cleaning", "un", 599, 28, 8),
    ("Dish Detergent 500ml", "Cleaning", "un", 329, 40, 10),
    ("Toilet Paper 12pk", "Cleaning", "un", 1899, 26, 8),
    ("Shampoo 350ml", "Personal Care", "un", 1549, 16, 5),
    ("Toothpaste 90g", "Personal Care", "un", 499, 44, 12),
];

/// Demo client book: (name, phone).
const CLIENTS: &[(&str, &str)] = &[
    ("Ana Lima", "555-0101"),
    ("Bruno Reis", "555-0102"),
    ("Carla Dias", "555-0103"),
    ("Diego Nunes", "555-0104"),
    ("Elisa Prado", "555-0105"),
    ("Fabio Rocha", "555-0106"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./counter_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Counter POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./counter_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Counter POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products, skipping seed.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    for (name, phone) in CLIENTS {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: None,
            phone: Some(phone.to_string()),
            address: None,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await?;
    }
    println!("Seeded {} clients", CLIENTS.len());

    let product_repo = db.products();
    for (name, category, unit, price_cents, stock, min_stock) in PRODUCTS {
        let code = product_repo.next_code().await?;
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code,
            name: name.to_string(),
            category: Some(category.to_string()),
            unit: unit.to_string(),
            price_cents: *price_cents,
            stock_quantity: *stock,
            min_stock: *min_stock,
            created_at: now,
            updated_at: now,
        };
        product_repo.insert(&product).await?;
    }
    println!("Seeded {} products", PRODUCTS.len());

    let low = product_repo.list_below_min_stock().await?;
    println!("Low-stock products right after seeding: {}", low.len());

    println!();
    println!("Seed complete");

    Ok(())
}
