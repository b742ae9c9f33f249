use crate::services::record_table::DEFAULT_SCAN_PAGE_SIZE;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt::Display, num::NonZeroU32, str::FromStr};

const DEFAULT_THUMBNAIL_SIZE: NonZeroU32 = NonZeroU32::new(128).unwrap();

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Edge length of every generated thumbnail, in pixels.
    pub thumbnail_size: NonZeroU32,
    pub table_name: String,
    pub region: String,
    /// Prefix of object URLs written into thumbnail records.
    pub object_base_url: String,
    pub scan_page_size: usize,
    /// Run the pipeline for objects uploaded through `PUT /objects/...`.
    pub notify_on_upload: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Event-triggered thumbnail generator")]
pub struct Args {
    /// Host to bind to (overrides THUMBNAIL_SERVICE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides THUMBNAIL_SERVICE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where objects are stored (overrides THUMBNAIL_SERVICE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides THUMBNAIL_SERVICE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Thumbnail edge length in pixels (overrides THUMBNAIL_SIZE)
    #[arg(long)]
    pub thumbnail_size: Option<NonZeroU32>,

    /// Record table name (overrides THUMBNAIL_TABLE)
    #[arg(long)]
    pub table_name: Option<String>,

    /// Region label of the record table (overrides REGION_NAME)
    #[arg(long)]
    pub region: Option<String>,

    /// Base URL for object links (overrides THUMBNAIL_SERVICE_OBJECT_BASE_URL)
    #[arg(long)]
    pub object_base_url: Option<String>,

    /// Items per table scan page (overrides THUMBNAIL_SCAN_PAGE_SIZE)
    #[arg(long)]
    pub scan_page_size: Option<usize>,

    /// Do not generate thumbnails for uploads made through the object API
    #[arg(long)]
    pub no_notify_on_upload: bool,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::resolve(args)?, migrate))
    }

    /// Merge CLI values over environment values over defaults.
    pub fn resolve(args: Args) -> Result<Self> {
        let host = match args.host {
            Some(host) => host,
            None => env_or("THUMBNAIL_SERVICE_HOST", "0.0.0.0".to_string())?,
        };
        let port = match args.port {
            Some(port) => port,
            None => env_or("THUMBNAIL_SERVICE_PORT", 3000)?,
        };
        let storage_dir = match args.storage_dir {
            Some(dir) => dir,
            None => env_or("THUMBNAIL_SERVICE_STORAGE_DIR", "./data/objects".to_string())?,
        };
        let database_url = match args.database_url {
            Some(url) => url,
            None => env_or(
                "THUMBNAIL_SERVICE_DATABASE_URL",
                "sqlite://./data/meta/thumbnails.db".to_string(),
            )?,
        };
        let thumbnail_size = match args.thumbnail_size {
            Some(size) => size,
            None => env_or("THUMBNAIL_SIZE", DEFAULT_THUMBNAIL_SIZE)?,
        };
        let table_name = match args.table_name {
            Some(name) => name,
            None => env_or("THUMBNAIL_TABLE", "thumbnails".to_string())?,
        };
        let region = match args.region {
            Some(region) => region,
            None => env_or("REGION_NAME", "local".to_string())?,
        };
        let object_base_url = match args.object_base_url {
            Some(url) => url,
            None => env_or(
                "THUMBNAIL_SERVICE_OBJECT_BASE_URL",
                format!("http://{}:{}/objects", public_host(&host), port),
            )?,
        };
        let scan_page_size = match args.scan_page_size {
            Some(size) => size,
            None => env_or("THUMBNAIL_SCAN_PAGE_SIZE", DEFAULT_SCAN_PAGE_SIZE)?,
        };
        let notify_on_upload = if args.no_notify_on_upload {
            false
        } else {
            match env::var("THUMBNAIL_NOTIFY_ON_UPLOAD") {
                Ok(value) => parse_flag(&value).context("parsing THUMBNAIL_NOTIFY_ON_UPLOAD")?,
                Err(env::VarError::NotPresent) => true,
                Err(err) => return Err(err).context("reading THUMBNAIL_NOTIFY_ON_UPLOAD"),
            }
        };

        if scan_page_size == 0 {
            bail!("scan page size must be greater than zero");
        }

        Ok(Self {
            host,
            port,
            storage_dir,
            database_url,
            thumbnail_size,
            table_name,
            region,
            object_base_url,
            scan_page_size,
            notify_on_upload,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse `name`, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got `{}`", other),
    }
}

/// Wildcard bind addresses are not reachable as link targets.
fn public_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    }
}
