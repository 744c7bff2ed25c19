use crate::error::ConfigError;
use crate::filter::IsolationParams;
use crate::orientation::EstimatorParams;
use crate::output::RowSchema;
use crate::search::{QualityThresholds, SearchSettings};
use crate::types::{AngleWindow, DistanceWindow, Permutation};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Run report with chain rows; skipped when absent.
    pub json_out: Option<PathBuf>,
    /// Directory for density/spectrum PNGs of the selected permutation.
    pub debug_dir: Option<PathBuf>,
    pub schema: RowSchema,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Localization table (`{"columns": [...], "rows": [[...], ...]}`).
    pub input: PathBuf,
    pub output: OutputConfig,
    /// Manual angle window `[low, high]` in radians; disables the estimate
    /// of the angle and the permutation search.
    pub angle_range: Option<[f64; 2]>,
    /// Manual distance window `[low, high]`.
    pub distance_range: Option<[f64; 2]>,
    pub orders: usize,
    pub intensity_check: bool,
    pub intensity_ratio: f64,
    pub flip: bool,
    pub mirror: bool,
    pub search: bool,
    pub deep_search: bool,
    pub max_retries: usize,
    pub isolation: Option<IsolationParams>,
    /// Worker count; 0 uses every available CPU.
    pub threads: usize,
    pub estimator: EstimatorParams,
    pub quality: QualityThresholds,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: OutputConfig::default(),
            angle_range: None,
            distance_range: None,
            orders: 2,
            intensity_check: false,
            intensity_ratio: 1.0,
            flip: false,
            mirror: false,
            search: true,
            deep_search: false,
            max_retries: 2,
            isolation: None,
            threads: 0,
            estimator: EstimatorParams::default(),
            quality: QualityThresholds::default(),
        }
    }
}

impl RunConfig {
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            angle_override: self.angle_range.map(|[lo, hi]| AngleWindow::new(lo, hi)),
            distance_override: self.distance_range.map(|[lo, hi]| DistanceWindow::new(lo, hi)),
            orders: self.orders,
            intensity_ratio: self.intensity_check.then_some(self.intensity_ratio),
            permutation: Permutation::new(self.flip, self.mirror),
            search: self.search,
            deep_search: self.deep_search,
            max_retries: self.max_retries,
            isolation: self.isolation,
            threads: self.threads,
            estimator: self.estimator.clone(),
            quality: self.quality.clone(),
        }
    }

    /// Settings for the search controller, rejected when inconsistent.
    pub fn validate(&self) -> Result<SearchSettings, ConfigError> {
        if let Some([lo, hi]) = self.angle_range {
            for value in [lo, hi] {
                if !value.is_finite() {
                    return Err(ConfigError::NonFiniteAngle { value });
                }
            }
        }
        let settings = self.search_settings();
        settings.validate()?;
        Ok(settings)
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: RunConfig = serde_json::from_str(r#"{"input": "locs.json", "orders": 3}"#).unwrap();
        assert_eq!(cfg.orders, 3);
        assert!(cfg.search);
        assert_eq!(cfg.estimator.raster_size, 1024);
        let settings = cfg.validate().unwrap();
        assert_eq!(settings.intensity_ratio, None);
        assert_eq!(settings.permutation, Permutation::new(false, false));
    }

    #[test]
    fn overrides_and_flags_resolve() {
        let cfg: RunConfig = serde_json::from_str(
            r#"{
                "input": "locs.json",
                "angle_range": [0.1, 0.5],
                "distance_range": [1500, 2000],
                "intensity_check": true,
                "intensity_ratio": 0.8,
                "flip": true,
                "isolation": {"neighbors": 2, "radius": 300.0},
                "output": {"json_out": "out.json", "schema": "reduced"}
            }"#,
        )
        .unwrap();
        let s = cfg.validate().unwrap();
        assert_eq!(s.angle_override, Some(AngleWindow::new(0.1, 0.5)));
        assert_eq!(s.distance_override, Some(DistanceWindow::new(1500.0, 2000.0)));
        assert_eq!(s.intensity_ratio, Some(0.8));
        assert!(s.permutation.flip);
        assert_eq!(cfg.output.schema, RowSchema::Reduced);
        assert_eq!(s.plan().len(), 1);
    }

    #[test]
    fn inverted_distance_is_rejected() {
        let cfg = RunConfig {
            distance_range: Some([10.0, 5.0]),
            ..RunConfig::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err(),
            ConfigError::InvertedDistance { low: 10.0, high: 5.0 }
        );
    }

    #[test]
    fn invalid_isolation_radius_is_rejected() {
        let cfg = RunConfig {
            isolation: Some(IsolationParams {
                neighbors: 2,
                radius: -1.0,
            }),
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::InvalidRadius(-1.0));
    }
}
