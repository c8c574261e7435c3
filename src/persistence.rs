//! Model serialization and persistence
//!
//! Saves a trained solution together with the configuration that produced
//! it, so a later run can resume training from it or evaluate without
//! retraining.

use crate::core::{PerceptronError, Result, Solution, TrainConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained perceptron model
#[derive(Serialize, Deserialize)]
pub struct SavedModel {
    /// The trained solution state
    pub solution: Solution,
    /// Configuration the solution was trained with
    pub config: TrainConfig,
    /// Kernel type identifier ("linear", "polynomial", "rbf")
    pub kernel_type: String,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of training samples behind the dual coefficients
    pub n_samples: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl SavedModel {
    /// Package a trained solution for saving
    pub fn new(solution: Solution, config: TrainConfig, kernel_type: &str) -> Self {
        let n_samples = solution.alpha.len();
        Self {
            solution,
            config,
            kernel_type: kernel_type.to_string(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_samples,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(PerceptronError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PerceptronError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(PerceptronError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| PerceptronError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Recover the solution, consuming the saved model
    ///
    /// The returned value feeds an engine's `with_initial_solution` to
    /// resume training where the saved run stopped.
    pub fn into_solution(self) -> Solution {
        self.solution
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== Perceptron Model Summary ===");
        println!("Kernel Type: {}", self.kernel_type);
        println!("Dimension: {}", self.solution.dim());
        println!("Samples: {}", self.metadata.n_samples);
        println!("Bias: {:.6}", self.solution.bias);
        println!("Norm: {:.6}", self.solution.norm);
        println!("Margin: {:.6}", self.solution.margin);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  Rate: {}", self.config.rate);
        println!("  Q: {}", self.config.q);
        println!("  Gamma: {}", self.config.gamma);
        println!("  Flexible: {}", self.config.flexible);
    }
}
