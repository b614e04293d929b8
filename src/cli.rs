use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CSV_DIR: &str = "jcr_mate";
pub const DEFAULT_DB_PATH: &str = "data/jcr.db";

#[derive(Parser, Debug)]
#[command(
    name = "jcrdb",
    version,
    about = "Rebuild the journal metrics database from CSV exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Rebuild(RebuildArgs),
    Status(StatusArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Self::Rebuild(RebuildArgs::default())
    }
}

#[derive(Args, Debug, Clone)]
pub struct RebuildArgs {
    #[arg(long, default_value = DEFAULT_CSV_DIR)]
    pub csv_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,
}

impl Default for RebuildArgs {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from(DEFAULT_CSV_DIR),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
