//! CRM command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! crm seed
//! crm customers
//! crm create-customer --name Alice --email alice@example.com --phone +1234567890
//! crm bulk-create customers.json
//! crm create-product --name Laptop --price 999.99 --stock 10
//! crm create-order --customer <uuid> --product <uuid> --product <uuid>
//! crm exec '{"op":"customers"}'
//! ```
//!
//! Every API command prints one JSON envelope and exits non-zero when the
//! envelope is not `ok`.

mod config;

use clap::{Parser, Subcommand};
use config::Config;
use crm_core::db::open_db;
use crm_core::{
    seed_defaults, ApiResponse, CrmApi, NewCustomer, NewOrder, NewProduct, SqliteCrmRepository,
};
use log::error;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "crm")]
#[command(version, about = "CRM data layer tools")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load demo customers and products; safe to run repeatedly
    Seed,
    /// List all customers
    Customers,
    /// List all products
    Products,
    /// Create one customer
    CreateCustomer {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Create customers from a JSON array file (`-` reads stdin)
    BulkCreate { file: PathBuf },
    /// Create one product
    CreateProduct {
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        stock: Option<i64>,
    },
    /// Create one order
    CreateOrder {
        #[arg(short, long)]
        customer: Uuid,
        /// Product id; repeat for several products
        #[arg(short, long = "product")]
        products: Vec<Uuid>,
        /// Order date in Unix epoch milliseconds
        #[arg(long)]
        order_date: Option<i64>,
    },
    /// Show one order
    Order { id: Uuid },
    /// Execute a raw JSON request, e.g. '{"op":"customers"}'
    Exec { request: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = cli.config.init_logging() {
        eprintln!("logging setup failed: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("command failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let conn = open_db(&cli.config.db_path)?;
    let repo = SqliteCrmRepository::try_new(&conn)?;

    let api = CrmApi::new(repo);
    let response = match cli.command {
        Commands::Seed => {
            let report = seed_defaults(&repo)?;
            println!(
                "seeded customers_created={} customers_existing={} products_created={} products_existing={}",
                report.customers_created,
                report.customers_existing,
                report.products_created,
                report.products_existing
            );
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Customers => api.customers(),
        Commands::Products => api.products(),
        Commands::CreateCustomer { name, email, phone } => api.create_customer(&NewCustomer {
            name,
            email,
            phone,
        }),
        Commands::BulkCreate { file } => {
            let customers: Vec<NewCustomer> = serde_json::from_str(&read_input(&file)?)?;
            api.bulk_create_customers(&customers)
        }
        Commands::CreateProduct { name, price, stock } => {
            api.create_product(&NewProduct { name, price, stock })
        }
        Commands::CreateOrder {
            customer,
            products,
            order_date,
        } => api.create_order(&NewOrder {
            customer_id: customer,
            product_ids: products,
            order_date,
        }),
        Commands::Order { id } => api.order(id),
        Commands::Exec { request } => api.execute_str(&request),
    };

    Ok(print_response(&response))
}

fn print_response(response: &ApiResponse) -> ExitCode {
    println!("{}", response.to_json());
    exit_code(response.ok)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path)
}
