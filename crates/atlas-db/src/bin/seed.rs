//! # Seed Data Generator
//!
//! Populates the database with demo variations for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 variations (default)
//! cargo run -p atlas-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p atlas-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p atlas-db --bin seed -- --db ./data/atlas.db
//! ```
//!
//! Each variation gets a unique SKU `{LINE}-{NAME}-{SIZE}-{INDEX}`, a
//! deterministic pseudo-random price and an initial stock level, so a dev
//! database is reproducible enough to demo sales and drawer sessions.

use std::env;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use atlas_core::Variation;
use atlas_db::{Database, DbConfig};

/// Product lines for realistic variation data.
const LINES: &[(&str, &[&str])] = &[
    (
        "TEE",
        &[
            "Crew Tee", "V-Neck Tee", "Pocket Tee", "Longline Tee", "Raglan Tee",
            "Graphic Tee", "Striped Tee", "Henley",
        ],
    ),
    (
        "DNM",
        &[
            "Slim Jeans", "Straight Jeans", "Relaxed Jeans", "Denim Jacket",
            "Denim Skirt", "Denim Shorts",
        ],
    ),
    (
        "SHO",
        &[
            "Canvas Sneaker", "Leather Sneaker", "Running Shoe", "Chelsea Boot",
            "Loafer", "Sandal",
        ],
    ),
    (
        "ACC",
        &[
            "Baseball Cap", "Beanie", "Canvas Belt", "Leather Belt", "Tote Bag",
            "Crew Socks", "Scarf",
        ],
    ),
];

/// Size variants with a price addon in cents.
const SIZES: &[(&str, i64)] = &[
    ("P", 0),
    ("M", 0),
    ("G", 200),
    ("GG", 350),
    ("34", 0),
    ("38", 0),
    ("42", 150),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./atlas_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Atlas POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of variations to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./atlas_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count = count, "Seeding dev data");

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    let existing = db.variations().count().await?;
    if existing > 0 {
        info!(
            existing = existing,
            "Database already has variations; skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for (line_idx, (line_code, names)) in LINES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = line_idx * 1000 + name_idx * 20 + size_idx;
                let variation = generate_variation(line_code, name, size, *price_addon, seed);

                if let Err(e) = db.variations().insert(&variation).await {
                    eprintln!("Failed to insert {}: {}", variation.sku, e);
                    continue;
                }

                generated += 1;
            }
        }
    }

    info!(
        generated = generated,
        elapsed = ?start.elapsed(),
        "Seed complete"
    );

    Ok(())
}

/// Generates a single variation with deterministic pseudo-random data.
fn generate_variation(
    line: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> Variation {
    let now = Utc::now();

    let compact: String = name.replace(' ', "");
    let sku = format!(
        "{}-{}-{}-{:03}",
        line,
        &compact[..compact.len().min(3)].to_uppercase(),
        size,
        seed
    );

    // Base price 19.90 - 99.90 plus size addon
    let base_price = 1990 + ((seed * 37) % 8000) as i64;

    Variation {
        id: Uuid::new_v4().to_string(),
        sku,
        name: format!("{} {}", name, size),
        unit_price_cents: base_price + price_addon,
        stock_qty: (seed % 40) as i64,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
