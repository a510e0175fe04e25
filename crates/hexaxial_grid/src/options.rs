use std::{
    fs::{File, read_to_string},
    io::Write,
    path::Path,
    time::Duration,
};

use hexaxial_data::{
    layout::{HexLayout, LayoutError, WorldLayout},
    math::{Float, UInt, Vec2, Vec3},
};
use ron::{Options, extensions::Extensions, ser::PrettyConfig};
use serde::{Deserialize, Serialize};

pub static OPTIONS_PATH: &str = "grid_options.ron";

pub const RON_EXTENSIONS: Extensions = Extensions::UNWRAP_NEWTYPES
    .union(Extensions::IMPLICIT_SOME)
    .union(Extensions::UNWRAP_VARIANT_NEWTYPES);

pub fn ron_options() -> Options {
    Options::default().with_default_extension(RON_EXTENSIONS)
}

/// Number of rescale workers.
pub const MAX_WORKERS: usize = 4;
/// Number of manually placed cells kept before the oldest is dropped.
pub const PLACEMENT_CAPACITY: usize = 100;

/// The default build timeout is this many polls at this interval.
const BUILD_POLL_INTERVAL_MS: u64 = 50;
const BUILD_POLL_ATTEMPTS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub side_length: Float,
    pub grid_radius: UInt,
    pub offset: Vec2,
    pub viewport: Vec2,

    pub world_offset: Vec3,
    pub world_side_length: Float,

    pub max_workers: usize,
    pub placement_capacity: usize,
    pub build_timeout_ms: u64,

    /// Whether the options file matches these options.
    #[serde(skip)]
    pub synced: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            side_length: 50.0,
            grid_radius: 2,
            offset: Vec2::new(1280.0 / 2.0, 720.0 / 2.0),
            viewport: Vec2::new(1280.0, 720.0),

            world_offset: Vec3::new(0.0, 0.5, 0.0),
            world_side_length: 0.985,

            max_workers: MAX_WORKERS,
            placement_capacity: PLACEMENT_CAPACITY,
            build_timeout_ms: BUILD_POLL_INTERVAL_MS * BUILD_POLL_ATTEMPTS,

            synced: false,
        }
    }
}

impl GridOptions {
    pub fn load() -> Self {
        Self::load_from(Path::new(OPTIONS_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        log::info!("Loading grid options...");

        let file = read_to_string(path).unwrap_or_default();

        let mut this: GridOptions = ron_options()
            .from_str(&file)
            .inspect_err(|err| log::warn!("Error parsing grid options! A fresh one will be created. Error: {err}"))
            .unwrap_or_default();

        if let Err(err) = this.save_to(path) {
            log::error!("Error saving grid options! {err}");
        }

        this
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        self.save_to(Path::new(OPTIONS_PATH))
    }

    pub fn save_to(&mut self, path: &Path) -> anyhow::Result<()> {
        let mut file = File::create(path)?;

        log::info!("Serializing grid options...");
        log::debug!("\n{self:?}");

        let document = ron_options()
            .to_string_pretty(&self, PrettyConfig::default())
            .inspect_err(|err| log::warn!("Error writing grid options! Error: {err}"))?;

        log::info!("Saving grid options...");

        write!(&mut file, "{document}")?;

        log::info!("Saved grid options!");

        self.synced = true;

        Ok(())
    }

    /// Saves the options if they changed since the last save. Returns whether anything was written.
    pub fn sync(&mut self) -> anyhow::Result<bool> {
        self.sync_to(Path::new(OPTIONS_PATH))
    }

    pub fn sync_to(&mut self, path: &Path) -> anyhow::Result<bool> {
        if self.synced {
            return Ok(false);
        }

        self.save_to(path)?;

        Ok(true)
    }

    pub fn layout(&self) -> Result<HexLayout, LayoutError> {
        HexLayout::new(self.offset, self.side_length)
    }

    pub fn world_layout(&self) -> Result<WorldLayout, LayoutError> {
        WorldLayout::new(self.world_offset, self.world_side_length)
    }

    #[inline]
    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_millis(self.build_timeout_ms)
    }

    /// Worker count actually used, never zero.
    #[inline]
    #[must_use]
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_round_trip() {
        let path = std::env::temp_dir().join(format!("hexaxial_options_{}.ron", std::process::id()));

        let mut options = GridOptions {
            side_length: 75.0,
            grid_radius: 5,
            max_workers: 2,
            ..Default::default()
        };
        options.save_to(&path).unwrap();

        let loaded = GridOptions::load_from(&path);
        assert_eq!(loaded.side_length, 75.0);
        assert_eq!(loaded.grid_radius, 5);
        assert_eq!(loaded.max_workers, 2);
        assert_eq!(loaded.placement_capacity, PLACEMENT_CAPACITY);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_options_partial_and_broken_files() {
        let path = std::env::temp_dir().join(format!("hexaxial_options_partial_{}.ron", std::process::id()));

        std::fs::write(&path, "(grid_radius: 7)").unwrap();
        let loaded = GridOptions::load_from(&path);
        assert_eq!(loaded.grid_radius, 7);
        assert_eq!(loaded.side_length, 50.0);

        std::fs::write(&path, "this is not ron").unwrap();
        let loaded = GridOptions::load_from(&path);
        assert_eq!(loaded.grid_radius, 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_sync_only_writes_changes() {
        let path = std::env::temp_dir().join(format!("hexaxial_options_sync_{}.ron", std::process::id()));

        let mut options = GridOptions::load_from(&path);
        assert!(options.synced);
        assert!(!options.sync_to(&path).unwrap());

        options.grid_radius = 9;
        options.synced = false;
        assert!(options.sync_to(&path).unwrap());
        assert!(options.synced);
        assert_eq!(GridOptions::load_from(&path).grid_radius, 9);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_default_timeout_matches_poll_budget() {
        assert_eq!(GridOptions::default().build_timeout(), Duration::from_secs(5));
        assert_eq!(GridOptions { max_workers: 0, ..Default::default() }.workers(), 1);
    }
}
