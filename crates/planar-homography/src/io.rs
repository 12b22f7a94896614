//! JSON configuration and correspondence files.

use nalgebra::Point2;
use planar_homography_refine::RefineParams;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum HomographyIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, HomographyIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json_pretty<T: Serialize>(value: &T, path: &Path) -> Result<(), HomographyIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Linear estimator used for the initial homography.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Normalized direct linear transform.
    #[default]
    Dlt,
    /// Normal equations with `H[2][2] = 1`.
    LeastSquares,
}

/// Estimation settings.
///
/// ```json
/// { "method": "least_squares", "refine": { "tolerance": 1e-10, "patience": 100 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HomographyConfig {
    #[serde(default)]
    pub method: EstimationMethod,
    /// Run Levenberg-Marquardt refinement after the linear estimate.
    #[serde(default)]
    pub refine: Option<RefineParams>,
}

impl HomographyConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, HomographyIoError> {
        read_json(path.as_ref())
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), HomographyIoError> {
        write_json_pretty(self, path.as_ref())
    }
}

/// Point correspondences as stored on disk: `source[i] <-> target[i]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceFile {
    pub source: Vec<[f64; 2]>,
    pub target: Vec<[f64; 2]>,
}

impl CorrespondenceFile {
    pub fn from_points(source: &[Point2<f64>], target: &[Point2<f64>]) -> Self {
        Self {
            source: source.iter().map(|p| [p.x, p.y]).collect(),
            target: target.iter().map(|p| [p.x, p.y]).collect(),
        }
    }

    /// Source and target sets as points. Lengths are not checked here.
    pub fn to_points(&self) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
        let conv = |v: &[[f64; 2]]| -> Vec<Point2<f64>> {
            v.iter().map(|&[x, y]| Point2::new(x, y)).collect()
        };
        (conv(&self.source), conv(&self.target))
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, HomographyIoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), HomographyIoError> {
        write_json_pretty(self, path.as_ref())
    }
}
