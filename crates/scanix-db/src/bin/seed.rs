//! # Seed Data Generator
//!
//! Populates the database with development data: warehouses, categories,
//! products with volume-price tiers, and stock in every warehouse.
//!
//! ## Usage
//! ```bash
//! # Default: 200 products into ./scanix_dev.db
//! cargo run -p scanix-db --bin seed
//!
//! # Custom amount / path
//! cargo run -p scanix-db --bin seed -- --count 500 --db ./data/scanix.db
//! ```

use std::env;

use scanix_core::{NewProduct, NewWarehouse, PriceRuleSpec, StockAdjustment};
use scanix_db::{Database, DbConfig};

/// Product families with base names.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Bebidas",
        &[
            "Agua Mineral",
            "Gaseosa Cola",
            "Gaseosa Lima",
            "Jugo de Naranja",
            "Jugo de Manzana",
            "Soda",
            "Energizante",
            "Té Helado",
            "Cerveza Rubia",
            "Vino Tinto",
        ],
    ),
    (
        "Almacén",
        &[
            "Arroz Largo Fino",
            "Fideos Spaghetti",
            "Harina 000",
            "Azúcar",
            "Sal Fina",
            "Aceite de Girasol",
            "Yerba Mate",
            "Café Molido",
            "Galletitas Surtidas",
            "Mermelada de Durazno",
        ],
    ),
    (
        "Lácteos",
        &[
            "Leche Entera",
            "Leche Descremada",
            "Yogur Natural",
            "Queso Cremoso",
            "Manteca",
            "Crema de Leche",
            "Dulce de Leche",
            "Ricota",
        ],
    ),
    (
        "Limpieza",
        &[
            "Detergente",
            "Lavandina",
            "Jabón en Polvo",
            "Esponja",
            "Papel de Cocina",
            "Bolsas de Residuo",
        ],
    ),
];

/// Size variants with price add-ons in cents.
const SIZES: &[(&str, i64)] = &[
    ("500ml", 0),
    ("1L", 150),
    ("1.5L", 250),
    ("500g", 0),
    ("1kg", 200),
    ("Pack x6", 700),
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

    let mut count: usize = 200;
    let mut db_path = String::from("./scanix_dev.db");

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
                println!("Scanix Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./scanix_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Scanix Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Warehouses first: stock rows need both parents.
    let mut warehouses = Vec::new();
    for (name, location) in [
        ("Depósito Central", "Av. Corrientes 1234"),
        ("Sucursal Norte", "Av. Cabildo 2200"),
        ("Sucursal Sur", "Av. Mitre 850"),
    ] {
        let warehouse = db
            .warehouses()
            .create(NewWarehouse {
                name: name.to_string(),
                location: Some(location.to_string()),
            })
            .await?;
        warehouses.push(warehouse);
    }
    println!("✓ Created {} warehouses", warehouses.len());

    println!();
    println!("Generating products...");

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: for (category_name, products) in CATEGORIES {
        let category = db.categories().create(category_name).await?;

        for (product_idx, base_name) in products.iter().enumerate() {
            for (size_idx, (size_name, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = product_idx * SIZES.len() + size_idx;

                // Base price $1.99-$9.99 plus the size add-on.
                let price_cents = 199 + ((seed * 17) % 800) as i64 + price_addon;

                // Roughly every second product gets volume tiers.
                let rules = if seed % 2 == 0 {
                    vec![
                        PriceRuleSpec {
                            min_quantity: 10,
                            max_quantity: Some(49),
                            unit_price_cents: price_cents * 90 / 100,
                        },
                        PriceRuleSpec {
                            min_quantity: 50,
                            max_quantity: None,
                            unit_price_cents: price_cents * 80 / 100,
                        },
                    ]
                } else {
                    vec![]
                };

                let product = db
                    .products()
                    .create(
                        NewProduct {
                            sku: format!("{}-{:04}", category_sku_prefix(category_name), generated),
                            name: format!("{base_name} {size_name}"),
                            description: None,
                            price_cents,
                            category_id: Some(category.id.clone()),
                            image_url: None,
                        },
                        rules,
                    )
                    .await?;

                // Stock 0-100 per warehouse, skewed so some locations
                // are empty and transfers have something to do.
                for (warehouse_idx, warehouse) in warehouses.iter().enumerate() {
                    let quantity = ((seed * 31 + warehouse_idx * 47) % 101) as i64;
                    if quantity > 0 {
                        db.stock()
                            .adjust(StockAdjustment {
                                product_id: product.id.clone(),
                                warehouse_id: warehouse.id.clone(),
                                change: quantity,
                            })
                            .await?;
                    }
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let details = db.products().list_with_details().await?;
    let tiered = details.iter().filter(|d| !d.price_rules.is_empty()).count();
    println!("  {} products carry volume tiers", tiered);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn category_sku_prefix(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase()
}
