use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::constants;

/// Runtime configuration. Every option can also come from an `OSC_*`
/// environment variable; the defaults match a checkout laid out as
/// `images/`, `temp/` and `token_OSC` in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "osc-uploader", version)]
#[command(about = "Upload photo sets to OpenScanCloud for photogrammetry processing")]
pub struct Config {
    /// Directory holding one subdirectory per photo set
    #[arg(long, env = "OSC_IMAGES_DIR", value_name = "DIR", default_value = constants::DEFAULT_IMAGES_DIR)]
    pub images_dir: PathBuf,

    /// Staging directory for the archive and its parts. Cleared before each
    /// new archive, except for a `.gitkeep` placeholder.
    #[arg(long, env = "OSC_TEMP_DIR", value_name = "DIR", default_value = constants::DEFAULT_TEMP_DIR)]
    pub temp_dir: PathBuf,

    /// File containing the OpenScanCloud token
    ///
    /// Defaults to `token_OSC` in the working directory, or `~/.osc_token`
    /// when only that one exists.
    #[arg(long, env = "OSC_TOKEN_FILE", value_name = "FILE")]
    pub token_file: Option<PathBuf>,

    /// Base URL of the OpenScanCloud service
    #[arg(long, env = "OSC_SERVER", value_name = "URL", default_value = constants::DEFAULT_SERVER)]
    pub server: String,

    /// Shared service user
    #[arg(long, env = "OSC_USER", default_value = constants::DEFAULT_USER)]
    pub user: String,

    /// Shared service password
    #[arg(long, env = "OSC_PASSWORD", default_value = constants::DEFAULT_PASSWORD, hide_default_value = true)]
    pub password: String,

    /// Largest part uploaded in one transfer, in bytes
    #[arg(long, env = "OSC_SPLIT_SIZE", value_name = "BYTES", default_value_t = constants::DEFAULT_SPLIT_SIZE)]
    pub split_size: u64,
}

impl Config {
    /// Check the directories exist and the split size is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.images_dir.is_dir() {
            bail!("Images directory not found: {}", self.images_dir.display());
        }
        if !self.temp_dir.is_dir() {
            bail!("Temporary directory not found: {}", self.temp_dir.display());
        }
        if self.split_size == 0 {
            bail!("Split size must be greater than zero");
        }
        Ok(())
    }

    /// The token file to read: the configured one, else the default lookup.
    pub fn token_path(&self) -> PathBuf {
        match &self.token_file {
            Some(path) => path.clone(),
            None => default_token_path(Path::new(constants::TOKEN_FILE_NAME)),
        }
    }
}

/// `local` unless only the home-directory token file exists. When neither
/// exists the answer is `local`, the file users are told to create.
fn default_token_path(local: &Path) -> PathBuf {
    if !local.exists() {
        if let Some(home) = dirs::home_dir().map(|h| h.join(constants::HOME_TOKEN_FILE_NAME)) {
            if home.exists() {
                return home;
            }
        }
    }
    local.to_path_buf()
}
