//! # Seed Data Generator
//!
//! Populates a development database with the distributor's usual catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p aquagas-db --bin seed
//! cargo run -p aquagas-db --bin seed -- --db ./data/aquagas.db
//! ```
//!
//! Skips everything if products already exist.

use aquagas_core::Money;
use aquagas_db::{Database, DbConfig};
use std::env;

/// (name, price in centavos, category)
const PRODUCTS: &[(&str, i64, &str)] = &[
    ("Água Mineral 20L", 1800, "agua"),
    ("Água Mineral 10L", 1200, "agua"),
    ("Gás GLP P13", 6000, "gas"),
    ("Gás GLP P45", 13500, "gas"),
];

const PAYMENT_METHODS: &[&str] = &["Dinheiro", "PIX", "Cartão Débito", "Cartão Crédito", "Fiado"];

/// (name, fee in centavos)
const SHIPPING_METHODS: &[(&str, i64)] = &[("Retirada", 0), ("Entrega", 500)];

/// (name, phone, address)
const CLIENTS: &[(&str, &str, &str)] = &[
    ("Maria Silva", "(27) 99812-3344", "Rua das Flores, 45"),
    ("João Santos", "(27) 99731-2200", "Av. Brasil, 1020"),
    ("Ana Costa", "(27) 98840-5511", "Rua Sete, 7"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./aquagas_dev.db");

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
                println!("Aquagas POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./aquagas_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Aquagas POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    for (name, cents, category) in PRODUCTS {
        db.products()
            .insert(name, Money::from_cents(*cents), category)
            .await?;
    }
    println!("✓ {} products", PRODUCTS.len());

    for name in PAYMENT_METHODS {
        db.methods().insert_payment_method(name).await?;
    }
    println!("✓ {} payment methods", PAYMENT_METHODS.len());

    for (name, cents) in SHIPPING_METHODS {
        db.methods()
            .insert_shipping_method(name, Money::from_cents(*cents))
            .await?;
    }
    println!("✓ {} shipping methods", SHIPPING_METHODS.len());

    for (name, phone, address) in CLIENTS {
        db.clients().insert(name, Some(*phone), Some(*address)).await?;
    }
    println!("✓ {} clients", CLIENTS.len());

    db.close().await;
    println!();
    println!("Done.");
    Ok(())
}
