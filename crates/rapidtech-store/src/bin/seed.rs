//! # Seed Data Generator
//!
//! Populates the database with laptops for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 laptops (default)
//! cargo run -p rapidtech-store --bin seed
//!
//! # Generate custom amount
//! cargo run -p rapidtech-store --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p rapidtech-store --bin seed -- --db ./data/rapidtech.db
//! ```
//!
//! ## Generated Products
//! Every laptop combines a brand line with a spec tier:
//! - Brands: Lenovo, Dell, HP, Apple, ASUS, Acer, MSI
//! - Categories: business, ultrabook, gaming, creator, budget
//! - CPU / RAM / storage / GPU / screen drawn from the tier
//!
//! Price grows with the tier, stock is 0 - 40, and roughly one laptop in
//! twelve is inactive. The bootstrap administrator from `ADMIN_*` is created
//! if the database has none.

use std::env;
use std::sync::Arc;
use std::time::Instant;

use rapidtech_core::{LaptopSpec, ProductInput};
use rapidtech_store::{Argon2Hasher, SqliteStore, Store, StoreConfig, Storefront, TokenManager};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (brand id, model lines)
const BRANDS: &[(&str, &[&str])] = &[
    ("lenovo", &["ThinkPad X1 Carbon", "ThinkPad T14", "IdeaPad Slim 5", "Legion 5 Pro", "Yoga 9i"]),
    ("dell", &["XPS 13", "XPS 15", "Latitude 7440", "Inspiron 16", "Alienware m16"]),
    ("hp", &["Spectre x360", "EliteBook 840", "Pavilion 15", "Omen 16", "ZBook Firefly"]),
    ("apple", &["MacBook Air 13", "MacBook Air 15", "MacBook Pro 14", "MacBook Pro 16"]),
    ("asus", &["Zenbook 14", "ROG Zephyrus G14", "TUF Gaming A15", "Vivobook 15", "ProArt Studiobook"]),
    ("acer", &["Swift Go 14", "Aspire 5", "Nitro V 15", "Predator Helios 16"]),
    ("msi", &["Prestige 14", "Katana 15", "Stealth 16", "Modern 15"]),
];

struct Tier {
    category: &'static str,
    cpu: &'static str,
    ram: &'static str,
    storage: &'static str,
    storage_type: &'static str,
    gpu: &'static str,
    screen_size: &'static str,
    screen_resolution: &'static str,
    base_price_cents: i64,
}

const TIERS: &[Tier] = &[
    Tier {
        category: "budget",
        cpu: "Intel Core i3-1315U",
        ram: "8GB",
        storage: "256GB",
        storage_type: "ssd",
        gpu: "Intel UHD",
        screen_size: "15.6\"",
        screen_resolution: "1920x1080",
        base_price_cents: 49_900,
    },
    Tier {
        category: "business",
        cpu: "Intel Core i5-1345U",
        ram: "16GB",
        storage: "512GB",
        storage_type: "ssd",
        gpu: "Intel Iris Xe",
        screen_size: "14\"",
        screen_resolution: "1920x1200",
        base_price_cents: 119_900,
    },
    Tier {
        category: "ultrabook",
        cpu: "Intel Core Ultra 7 155H",
        ram: "16GB",
        storage: "1TB",
        storage_type: "ssd",
        gpu: "Intel Arc",
        screen_size: "13.4\"",
        screen_resolution: "2880x1800",
        base_price_cents: 149_900,
    },
    Tier {
        category: "creator",
        cpu: "AMD Ryzen 9 7940HS",
        ram: "32GB",
        storage: "2TB",
        storage_type: "ssd",
        gpu: "NVIDIA RTX 4070",
        screen_size: "16\"",
        screen_resolution: "3200x2000",
        base_price_cents: 229_900,
    },
    Tier {
        category: "gaming",
        cpu: "Intel Core i9-14900HX",
        ram: "32GB",
        storage: "1TB",
        storage_type: "ssd",
        gpu: "NVIDIA RTX 4080",
        screen_size: "16\"",
        screen_resolution: "2560x1600",
        base_price_cents: 279_900,
    },
    Tier {
        category: "budget",
        cpu: "AMD Ryzen 5 7520U",
        ram: "8GB",
        storage: "1TB",
        storage_type: "hdd",
        gpu: "AMD Radeon 610M",
        screen_size: "15.6\"",
        screen_resolution: "1366x768",
        base_price_cents: 39_900,
    },
];

fn print_help() {
    println!("RapidTech Seed Data Generator");
    println!();
    println!("Usage: seed [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --count <N>    Number of laptops to generate (default: 50)");
    println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH)");
    println!("  -h, --help         Show this help message");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = StoreConfig::load()?;
    let mut count: usize = 50;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--count" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse().unwrap_or(50);
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if let Some(value) = args.get(i + 1) {
                    config.database_path = value.into();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(
        database = %config.database_path.display(),
        count,
        "Seeding storefront"
    );

    let store = SqliteStore::connect(config.db_config()).await?;
    let existing = store.database().products().count().await?;

    let storefront = Storefront::new(
        Arc::new(store.clone()),
        Arc::new(Argon2Hasher::default()),
        TokenManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
        config.op_timeout(),
    );

    match storefront
        .ensure_admin(&config.admin_email, &config.admin_full_name, &config.admin_password)
        .await?
    {
        Some(admin) => info!(email = %admin.email, "Administrator created"),
        None => info!("Administrator already present"),
    }

    if existing > 0 {
        warn!(
            existing,
            "Database already has products; skipping seed. Delete the database file to regenerate."
        );
        return Ok(());
    }

    let start = Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let input = generate_laptop(seed);
        let name = input.model_name.clone();

        if let Err(e) = store.insert_product(input).await {
            warn!(model = %name, error = %e, "Failed to insert laptop");
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            info!(generated, "Progress");
        }
    }

    let elapsed = start.elapsed();
    info!(
        generated,
        elapsed_ms = elapsed.as_millis() as u64,
        "Seed complete"
    );

    Ok(())
}

/// Generates a single laptop deterministically from `seed`.
fn generate_laptop(seed: usize) -> ProductInput {
    let (brand, models) = BRANDS[seed % BRANDS.len()];
    let model = models[(seed / BRANDS.len()) % models.len()];
    let tier = &TIERS[(seed * 7 + seed / 3) % TIERS.len()];

    // Spread prices within the tier: +$0 .. +$300 in $25 steps.
    let price_cents = tier.base_price_cents + ((seed * 5) % 13) as i64 * 2_500;
    let stock = ((seed * 17) % 41) as i64;
    let generation = 1 + seed / (BRANDS.len() * 5);

    ProductInput {
        model_name: format!("{model} ({} Gen {generation})", tier.category),
        brand_id: brand.to_string(),
        category_id: tier.category.to_string(),
        price_cents,
        stock,
        description: Some(format!(
            "{} laptop with {} and {} {}",
            tier.category, tier.cpu, tier.ram, tier.storage
        )),
        is_active: Some(seed % 12 != 11),
        specs: LaptopSpec {
            cpu: tier.cpu.to_string(),
            ram: tier.ram.to_string(),
            storage: tier.storage.to_string(),
            storage_type: tier.storage_type.to_string(),
            gpu: tier.gpu.to_string(),
            screen_size: tier.screen_size.to_string(),
            screen_resolution: tier.screen_resolution.to_string(),
        },
    }
}
