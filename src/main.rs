// src/main.rs
mod api;
mod audit;
mod carrier;
mod catalog;
mod config;
mod estimate;
mod packaging;
mod sellers;
mod shipment;
mod types;

use config::AppConfig;
use sellers::InMemorySellerDirectory;

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();

    let sellers = match &app_config.sellers_file {
        Some(path) => match InMemorySellerDirectory::from_json_file(path) {
            Ok(directory) => {
                println!(
                    "🏪 Loaded {} seller companies from {}",
                    directory.len(),
                    path.display()
                );
                directory
            }
            Err(err) => {
                eprintln!(
                    "⚠️ Could not load sellers from {}: {}. Starting with an empty directory.",
                    path.display(),
                    err
                );
                InMemorySellerDirectory::new()
            }
        },
        None => InMemorySellerDirectory::new(),
    };

    println!("🚀 Packaging service starting...");
    api::start_api_server(app_config, sellers).await;
}
