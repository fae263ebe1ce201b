// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Restores trained weights into a freshly built model using
// Burn's CompactRecorder.
//
//   weights file (.mpk, half precision MessagePack)
//       │  CompactRecorder::load
//       ▼
//   HumorDetectionRecord ──► model.load_record()
//
// The recorder owns the file extension: "model_csi_1" and
// "model_csi_1.mpk" name the same file.
//
// The architecture has to match the one the weights were saved
// from, so it can be read from a JSON file written alongside
// them (see load_model_config).
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::{HumorDetectionConfig, HumorDetectionModel};

#[derive(Debug, Default, Clone)]
pub struct CheckpointManager {
    recorder: CompactRecorder,
}

impl CheckpointManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the weights at `path` into `model`.
    ///
    /// Fails if the file is missing or the saved record does not
    /// match the model's architecture.
    pub fn load_weights<B: Backend>(
        &self,
        model:  HumorDetectionModel<B>,
        path:   &Path,
        device: &B::Device,
    ) -> Result<HumorDetectionModel<B>> {
        tracing::info!("Loading weights from '{}'", path.display());

        let record = self
            .recorder
            .load(path.to_path_buf(), device)
            .with_context(|| format!("Cannot load model weights from '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    /// Save `model`'s weights to `path`; returns the path written
    pub fn save_weights<B: Backend>(
        &self,
        model: &HumorDetectionModel<B>,
        path:  &Path,
    ) -> Result<PathBuf> {
        self.recorder
            .record(model.clone().into_record(), path.to_path_buf())
            .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;

        let written = path.with_extension(<CompactRecorder as burn::record::FileRecorder<B>>::file_extension());
        tracing::debug!("Saved weights to '{}'", written.display());
        Ok(written)
    }

    /// Read a model architecture from JSON
    pub fn load_model_config(path: &Path) -> Result<HumorDetectionConfig> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read model config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config in '{}'", path.display()))
    }
}

#[cfg(test)]
impl CheckpointManager {
    pub fn save_model_config(cfg: &HumorDetectionConfig, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;
        Ok(())
    }
}
