//! # Seed Data Generator
//!
//! Populates the database with a small pizzeria for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p pizza-db --bin seed
//!
//! # Specify database path
//! cargo run -p pizza-db --bin seed -- --db ./data/pizza_db.db
//! ```
//!
//! ## Generated Data
//! - Product types: Pizza, Drink, Dessert
//! - A menu of pizzas, drinks and desserts with vegan/vegetarian flags
//! - Couriers covering Maastricht postal areas (plus one off duty)
//! - Unused discount codes
//! - A few customers, one of them already past the loyalty threshold
//!
//! Skips everything when the database already has products.

use chrono::NaiveDate;
use std::env;

use pizza_core::{NewCustomer, PostalPrefix};
use pizza_db::{Database, DbConfig, NewProduct};

/// (name, type, vegan, vegetarian, cost in cents)
const PRODUCTS: &[(&str, &str, bool, bool, i64)] = &[
    ("Margherita", "Pizza", false, true, 520),
    ("Marinara", "Pizza", true, true, 450),
    ("Funghi", "Pizza", false, true, 580),
    ("Quattro Formaggi", "Pizza", false, true, 690),
    ("Salami", "Pizza", false, false, 640),
    ("Hawaii", "Pizza", false, false, 620),
    ("Tonno", "Pizza", false, false, 660),
    ("Verdure", "Pizza", true, true, 600),
    ("Diavola", "Pizza", false, false, 680),
    ("Calzone", "Pizza", false, false, 710),
    ("Cola", "Drink", true, true, 150),
    ("Sparkling Water", "Drink", true, true, 120),
    ("Lemonade", "Drink", true, true, 160),
    ("Iced Tea", "Drink", true, true, 160),
    ("Tiramisu", "Dessert", false, true, 300),
    ("Panna Cotta", "Dessert", false, true, 280),
    ("Sorbetto", "Dessert", true, true, 250),
];

/// (name, available, covered postal prefixes)
const COURIERS: &[(&str, bool, &[&str])] = &[
    ("Sam Peeters", true, &["6211", "6212"]),
    ("Lotte Janssen", true, &["6221", "6222"]),
    ("Milan de Vries", true, &["6229"]),
    ("Noor Bakker", true, &["6211", "6229"]),
    ("Jip Hendriks", false, &["6216"]),
];

/// (code, percent)
const DISCOUNT_CODES: &[(&str, i64)] = &[
    ("WELCOME10", 10),
    ("STUDENT15", 15),
    ("PIZZA20", 20),
    ("HALFOFF", 50),
];

/// (name, birth date, address, phone, pizzas to pre-load)
const CUSTOMERS: &[(&str, &str, &str, &str, i64)] = &[
    ("Anna Smeets", "1992-03-14", "Grote Gracht 12, 6211 SZ Maastricht", "+31 6 1234 5678", 0),
    ("Bram Claessens", "1985-11-02", "Tongersestraat 53, 6211 LM Maastricht", "+31 6 2345 6789", 12),
    ("Chloe Willems", "2001-07-28", "Avenue Céramique 50, 6221 KV Maastricht", "+31 6 3456 7890", 4),
    ("Daan Vos", "1980-02-29", "Dorpstraat 7, Gronsveld", "+31 6 4567 8901", 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/pizza_db.db");

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
                println!("Pizza Ordering Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/pizza_db.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🍕 Pizza Ordering Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    db.initialize().await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied, statuses seeded");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding menu...");
    for (name, type_name, is_vegan, is_vegetarian, cost_cents) in PRODUCTS {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                type_name: type_name.to_string(),
                is_vegan: *is_vegan,
                is_vegetarian: *is_vegetarian,
                cost_cents: *cost_cents,
            })
            .await?;
    }
    println!("  {} products", PRODUCTS.len());

    println!("Seeding couriers...");
    for (name, available, areas) in COURIERS {
        let courier = db.couriers().insert(name, *available).await?;
        for area in *areas {
            db.couriers().add_area(courier.id, &PostalPrefix::parse(area)?).await?;
        }
    }
    let couriers = db.couriers().list().await?;
    let on_duty = couriers.iter().filter(|c| c.is_available).count();
    println!("  {} couriers ({} on duty)", couriers.len(), on_duty);

    println!("Seeding discount codes...");
    for (code, percent) in DISCOUNT_CODES {
        db.discount_codes().insert(code, *percent).await?;
    }
    println!("  {} codes", DISCOUNT_CODES.len());

    println!("Seeding customers...");
    for (name, birth_date, address, phone, pizzas) in CUSTOMERS {
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: name.to_string(),
                birth_date: NaiveDate::parse_from_str(birth_date, "%Y-%m-%d")?,
                address: address.to_string(),
                phone: phone.to_string(),
            })
            .await?;

        if *pizzas > 0 {
            let mut tx = db.begin().await?;
            pizza_db::CustomerRepository::add_pizzas(&mut tx, customer.id, *pizzas).await?;
            tx.commit().await?;
        }
    }
    println!("  {} customers", CUSTOMERS.len());

    println!();
    let menu = db.products().menu().await?;
    if let Some(cheapest) = menu.iter().min_by_key(|p| p.price_cents) {
        println!("  Cheapest item: {} at {}", cheapest.name, cheapest.price());
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
