//! # Seed Data Generator
//!
//! Populates a development database with a small cooking-school catalog and
//! rings up one sample sale.
//!
//! ## Usage
//! ```bash
//! # Use atelier.toml / ATELIER_* settings
//! cargo run -p atelier-db --bin seed
//!
//! # Specify database path
//! cargo run -p atelier-db --bin seed -- --db ./data/atelier_dev.db
//!
//! # Specify config file
//! cargo run -p atelier-db --bin seed -- --config ./atelier.toml
//! ```
//!
//! ## Generated Data
//! - Courses and merchandise with baht prices
//! - Three employees and a handful of customers
//! - The "Baker Bundle" package (Bread Basics + Pastry Lab)
//! - One bill for two seats of Knife Skills 101, with its receipt printed

use atelier_core::{Cart, CheckoutRequest, DiscountRate, Money, PaymentMethod, SaleChannel};
use atelier_db::{AtelierConfig, Database, NewCustomer};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// (name, category, price in baht)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Knife Skills 101", "course", 1500),
    ("Thai Curry Basics", "course", 1800),
    ("Bread Basics", "course", 4000),
    ("Pastry Lab", "course", 6000),
    ("Fresh Pasta Workshop", "course", 2200),
    ("Sushi Rolling", "course", 2500),
    ("Street Food Classics", "course", 1900),
    ("Chef Apron", "merch", 350),
    ("Recipe Book Vol. 1", "merch", 590),
    ("Spice Starter Kit", "kit", 450),
];

/// (name, nickname, position)
const EMPLOYEES: &[(&str, &str, &str)] = &[
    ("Napat Srisuk", "Nan", "Sales"),
    ("Warin Chaiyo", "Win", "Sales"),
    ("Kanya Thongdee", "Kan", "Head Chef"),
];

/// (full name, nickname, phone)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Somchai Jaidee", "Chai", "081-234-5678"),
    ("Malee Suksan", "Lee", "089-111-2222"),
    ("Arthit Wongsa", "Art", "086-333-4444"),
    ("Pimchanok Rattana", "Pim", "082-555-6666"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Atelier Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (overrides config)");
                println!("  -c, --config <PATH>   Config file (default: platform config dir)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = AtelierConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!("Atelier Seed Data Generator");
    println!("===========================");
    println!("Database: {}", config.database.path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, category, baht) in PRODUCTS {
        let product = db
            .products()
            .insert(name, Some(*category), Money::from_baht(*baht))
            .await?;
        products.push(product);
    }
    println!("✓ Inserted {} products", products.len());

    let mut employees = Vec::with_capacity(EMPLOYEES.len());
    for (name, nickname, position) in EMPLOYEES {
        let employee = db
            .parties()
            .insert_employee(name, Some(*nickname), Some(*position))
            .await?;
        employees.push(employee);
    }
    println!("✓ Inserted {} employees", employees.len());

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (index, (full_name, nickname, phone)) in CUSTOMERS.iter().enumerate() {
        let customer = db
            .parties()
            .insert_customer(NewCustomer {
                full_name: full_name.to_string(),
                nickname: Some(nickname.to_string()),
                phone: Some(phone.to_string()),
                line_id: None,
                assigned_sales_id: Some(employees[index % 2].emp_id),
            })
            .await?;
        customers.push(customer);
    }
    println!("✓ Inserted {} customers", customers.len());

    let bundle_ids: Vec<_> = products
        .iter()
        .filter(|p| p.product_name == "Bread Basics" || p.product_name == "Pastry Lab")
        .map(|p| p.product_id)
        .collect();
    let bundle = db
        .packages()
        .insert(
            "Baker Bundle",
            Money::from_baht(10_000),
            Money::from_baht(8000),
            Some("Two baking courses at a bundle price"),
            &bundle_ids,
        )
        .await?;
    println!("✓ Inserted package '{}'", bundle.package_name);

    // Sample sale
    let checkout = db
        .checkout(config.checkout.credit_policy())
        .max_attempts(config.checkout.max_commit_attempts);

    let mut cart = Cart::new();
    checkout
        .add_product(&mut cart, products[0].product_id, 2, true)
        .await?;

    let request = CheckoutRequest::new(
        customers[0].clone(),
        employees[0].clone(),
        PaymentMethod::Cash,
        SaleChannel::LineOa,
    )
    .with_discount(DiscountRate::from_percent(10))
    .with_note("Seeded sample sale");

    let receipt = checkout.commit(&mut cart, &request).await?;
    info!(bill_id = %receipt.bill_id, "Sample sale committed");

    println!();
    println!("{}", receipt.to_text());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Sets up logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=atelier=trace` - Show trace for atelier crates only
/// - Default: info, debug for atelier crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atelier=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
