//! Footwear catalog server.
//!
//! Loads a collector's flat file into memory and serves it over the products
//! REST API until shutdown. Changes made through the API are not persisted.

use std::path::Path;

use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use config::Config;
use dotenvy::dotenv;

use footwear_catalog::loader::load_table;
use footwear_catalog::models::config::ServerConfig;
use footwear_catalog::repository::InMemoryRepository;
use footwear_catalog::routes::configure;
use footwear_catalog::services::visualization::chart_templates;

/// Serve a scraped footwear catalog over HTTP
#[derive(Parser, Debug)]
#[command(name = "footwear-catalog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Data file (CSV or JSON) to load instead of the configured one
    data_file: Option<String>,
}

fn load_config(args: &Args) -> Result<ServerConfig, config::ConfigError> {
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .set_override_option("data_file", args.data_file.clone())?
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let server_config = match load_config(&args) {
        Ok(server_config) => server_config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let (table, report) = match load_table(Path::new(&server_config.data_file)) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load {}: {e}", server_config.data_file);
            std::process::exit(1);
        }
    };
    if report.skipped > 0 {
        log::warn!(
            "{} rows of {} were skipped",
            report.skipped,
            server_config.data_file
        );
    }

    let tera = match chart_templates() {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to build chart templates: {e}");
            std::process::exit(1);
        }
    };

    let repo = web::Data::new(InMemoryRepository::new(table));
    let tera = web::Data::new(tera);
    let bind_address = (server_config.address.clone(), server_config.port);
    let server_config = web::Data::new(server_config);

    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(repo.clone())
            .app_data(tera.clone())
            .app_data(server_config.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
