//! TOML configuration shared by the server and the viewer.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid configuration.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::render::Layout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address
    pub addr: SocketAddr,

    /// Side of the square grid
    pub grid_size: usize,

    /// Probability of a cell starting alive
    pub density: f64,

    /// Seed for the initial grid. `None` picks one at random.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            grid_size: 64,
            density: 0.1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub server_url: String,

    /// Side the server's grids must have
    pub grid_size: usize,

    /// Virtual size of a live cell
    pub cell_size: f64,

    /// Virtual spacing of the background grid
    pub grid_spacing: f64,

    /// Real units moved per pan input
    pub pan_speed: f64,

    /// Scale multiplier of a zoom in key press. Below 1, since a lower scale magnifies.
    pub zoom_in_factor: f64,

    /// Scale multiplier of a zoom out key press
    pub zoom_out_factor: f64,

    /// Proportional zoom per mouse wheel notch
    pub zoom_speed: f64,

    /// Where to write logs. Nothing is logged when unset, since the terminal is taken.
    pub log_file: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:3000/ws".into(),
            grid_size: 64,
            cell_size: 64.0,
            grid_spacing: 40.0,
            pan_speed: 10.0,
            zoom_in_factor: 0.9,
            zoom_out_factor: 1.1,
            zoom_speed: 0.1,
            log_file: None,
        }
    }
}

impl ViewConfig {
    pub fn layout(&self) -> Layout {
        Layout {
            cell_size: self.cell_size,
            grid_spacing: self.grid_spacing,
        }
    }
}

impl Config {
    /// Load the configuration at `path`, or the defaults if there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        let view = &self.view;

        if server.grid_size == 0 || view.grid_size == 0 {
            return invalid("grid_size must be at least 1");
        }

        if !(0.0..=1.0).contains(&server.density) {
            return invalid(format!("density must be in [0, 1], got {}", server.density));
        }

        for (name, value) in [
            ("cell_size", view.cell_size),
            ("grid_spacing", view.grid_spacing),
            ("pan_speed", view.pan_speed),
            ("zoom_in_factor", view.zoom_in_factor),
            ("zoom_out_factor", view.zoom_out_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }

        if !(view.zoom_speed > 0.0 && view.zoom_speed < 1.0) {
            return invalid(format!(
                "zoom_speed must be in (0, 1), got {}",
                view.zoom_speed
            ));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}
