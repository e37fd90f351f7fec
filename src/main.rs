//! Agri Inference CLI
//!
//! Serves the crop, soil and fertilizer models over HTTP, and doubles as a
//! client for a running server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use tracing::info;

use agri_inference::client::{AgriClient, ClientError, CROP_TYPES, DEFAULT_API_URL, SOIL_TYPES};
use agri_inference::config::ServerConfig;
use agri_inference::inference::{CropQuery, FertilizerQuery};
use agri_inference::model::ModelRegistry;
use agri_inference::server;
use agri_inference::utils::logging::{init_logging, LogConfig, LogLevel};

/// Crop, soil and fertilizer model inference service
#[derive(Parser, Debug)]
#[command(name = "agri-inference")]
#[command(version)]
#[command(about = "Crop recommendation, soil classification and fertilizer recommendation API", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AGRI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the models and start the HTTP server
    Serve {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long, env = "AGRI_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "AGRI_PORT")]
        port: Option<u16>,

        /// Directory containing the model artifacts
        #[arg(short, long, env = "AGRI_MODELS_DIR")]
        models_dir: Option<PathBuf>,

        /// Maximum upload size in bytes
        #[arg(long)]
        max_upload_bytes: Option<usize>,

        /// Hide the text of internal errors from clients
        #[arg(long, default_value = "false")]
        redact_internal_errors: bool,
    },

    /// Recommend crops for soil and climate readings
    Crop {
        /// Server URL
        #[arg(long, env = "AGRI_API_URL", default_value = DEFAULT_API_URL)]
        url: String,

        /// Nitrogen (N)
        #[arg(long = "nitrogen")]
        n: f64,

        /// Phosphorous (P)
        #[arg(long = "phosphorous")]
        p: f64,

        /// Potassium (K)
        #[arg(long = "potassium")]
        k: f64,

        /// Temperature (°C)
        #[arg(long)]
        temperature: f64,

        /// Humidity (%)
        #[arg(long)]
        humidity: f64,

        /// Soil pH
        #[arg(long)]
        ph: f64,

        /// Rainfall (mm)
        #[arg(long)]
        rainfall: f64,
    },

    /// Classify the soil in an image
    Soil {
        /// Server URL
        #[arg(long, env = "AGRI_API_URL", default_value = DEFAULT_API_URL)]
        url: String,

        /// Path to a jpg/png soil image
        #[arg(short, long)]
        image: PathBuf,
    },

    /// Recommend a fertilizer for field conditions
    Fertilizer {
        /// Server URL
        #[arg(long, env = "AGRI_API_URL", default_value = DEFAULT_API_URL)]
        url: String,

        /// Temperature (°C)
        #[arg(long)]
        temperature: f64,

        /// Humidity (%)
        #[arg(long)]
        humidity: f64,

        /// Moisture (%)
        #[arg(long)]
        moisture: f64,

        /// Soil type
        #[arg(long, value_parser = PossibleValuesParser::new(SOIL_TYPES))]
        soil_type: String,

        /// Crop type
        #[arg(long, value_parser = PossibleValuesParser::new(CROP_TYPES))]
        crop_type: String,

        /// Nitrogen (N)
        #[arg(long)]
        nitrogen: f64,

        /// Potassium (K)
        #[arg(long)]
        potassium: f64,

        /// Phosphorous (P)
        #[arg(long)]
        phosphorous: f64,
    },

    /// Check that a server is up
    Health {
        /// Server URL
        #[arg(long, env = "AGRI_API_URL", default_value = DEFAULT_API_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    if let Some(level) = cli.log_level.as_deref() {
        log_config = log_config.with_level(LogLevel::parse(level));
    }

    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            models_dir,
            max_upload_bytes,
            redact_internal_errors,
        } => {
            let mut server_config = match config {
                Some(path) => ServerConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ServerConfig::default(),
            };

            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(models_dir) = models_dir {
                server_config.models_dir = models_dir;
            }
            if let Some(max_upload_bytes) = max_upload_bytes {
                server_config.max_upload_bytes = max_upload_bytes;
            }
            if redact_internal_errors {
                server_config.redact_internal_errors = true;
            }

            cmd_serve(server_config).await?;
        }

        Commands::Crop {
            url,
            n,
            p,
            k,
            temperature,
            humidity,
            ph,
            rainfall,
        } => {
            let query = CropQuery {
                n,
                p,
                k,
                temperature,
                humidity,
                ph,
                rainfall,
            };
            let client = AgriClient::new(&url)?;
            report(client.predict_crop(&query).await, "Failed to get prediction")?;
        }

        Commands::Soil { url, image } => {
            cmd_soil(&url, &image).await?;
        }

        Commands::Fertilizer {
            url,
            temperature,
            humidity,
            moisture,
            soil_type,
            crop_type,
            nitrogen,
            potassium,
            phosphorous,
        } => {
            let query = FertilizerQuery {
                temparature: temperature,
                humidity,
                moisture,
                soil_type,
                crop_type,
                nitrogen,
                potassium,
                phosphorous,
            };
            let client = AgriClient::new(&url)?;
            report(client.recommend_fertilizer(&query).await, "Failed to get recommendation")?;
        }

        Commands::Health { url } => {
            cmd_health(&url).await?;
        }
    }

    Ok(())
}

async fn cmd_serve(config: ServerConfig) -> Result<()> {
    config.validate()?;

    info!("Agri Inference Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Bind address: {}:{}", config.host, config.port);
    info!("  Models dir:   {:?}", config.models_dir);
    info!("  Upload limit: {} bytes", config.max_upload_bytes);
    info!("  Redact internal errors: {}", config.redact_internal_errors);

    let paths = config.artifact_paths();
    for (name, path) in paths.entries() {
        info!("  {:<28} {}", name, path.display());
    }

    let registry = ModelRegistry::load(&paths).context("Failed to load model artifacts")?;
    info!("All models loaded");

    server::serve(config, registry).await?;
    Ok(())
}

async fn cmd_soil(url: &str, image: &Path) -> Result<()> {
    let bytes = std::fs::read(image).with_context(|| format!("Failed to read image {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.jpg".to_string());

    let client = AgriClient::new(url)?;
    report(client.classify_soil(bytes, &file_name).await, "Failed to classify soil")
}

async fn cmd_health(url: &str) -> Result<()> {
    let client = AgriClient::new(url)?;

    let health = client.health().await?;
    let welcome = client.welcome().await?;

    println!("{} {}", "Server:".cyan(), client.url());
    println!("{} {}", "Status:".cyan(), health.status.green());
    println!("{} {}", "Version:".cyan(), health.version);
    println!("{} {}s", "Uptime:".cyan(), health.uptime_seconds);
    println!("{} {}", "Tasks:".cyan(), health.tasks.join(", "));
    println!("{} {}", "Message:".cyan(), welcome.message);

    Ok(())
}

/// Print a 200 body as JSON; any other status prints `failure` and exits 1
fn report(result: std::result::Result<Value, ClientError>, failure: &str) -> Result<()> {
    match result {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(ClientError::Status { status, body }) => {
            println!("{} {}", failure.red().bold(), format!("({})", status).dimmed());
            tracing::debug!("Response body: {}", body);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
