use api_shared::{upload_error_message, HealthService, UPLOAD_OK_BODY};
use clap::{Parser, Subcommand};
use relay_core::{RelayConfig, RelayServices};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Upload relay CLI; uses the same RELAY_* configuration as the server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the configured storage backend and print the health response
    Health,
    /// Store a local file in the container for a collection
    Upload {
        /// Collection id (container name)
        collection_id: String,
        /// File to upload
        path: PathBuf,
        /// Name to store the file under (defaults to the file's own name)
        #[arg(long)]
        filename: Option<String>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RelayConfig::from_lookup(|key| std::env::var(key).ok())?;
    let services = RelayServices::from_config(&config);

    match cli.command {
        Some(Commands::Health) => {
            let res = HealthService::new(services.prober).check_health_blocking();
            println!("{}", serde_json::to_string(&res)?);
            if res.status != api_shared::STATUS_OK {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Upload {
            collection_id,
            path,
            filename,
        }) => {
            let filename = match filename {
                Some(name) => name,
                None => match path.file_name() {
                    Some(name) => name.to_string_lossy().into_owned(),
                    None => {
                        eprintln!("{}", upload_error_message("path has no file name"));
                        return Ok(ExitCode::FAILURE);
                    }
                },
            };
            let mut file = File::open(&path)?;
            match services.engine.transfer(&mut file, &filename, &collection_id) {
                Ok(receipt) => {
                    println!(
                        "{}: stored {} bytes as {}/{}",
                        UPLOAD_OK_BODY,
                        receipt.bytes_written,
                        receipt.collection_id,
                        receipt.filename
                    );
                }
                Err(e) => {
                    eprintln!("{}", upload_error_message(e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        None => {
            println!("Use 'relay --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}
