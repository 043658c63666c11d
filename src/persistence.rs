use ndarray::{Array2, Dimension};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::layers::linear::LinearLayer;
use crate::layers::lstm_cell::LSTMCell;
use crate::model::SequenceClassifier;
use crate::normalize::SequenceNormalizer;

/// Serializable version of Array2<f64> for persistence
#[derive(Serialize, Deserialize)]
struct SerializableArray2 {
    data: Vec<f64>,
    shape: (usize, usize),
}

impl From<&Array2<f64>> for SerializableArray2 {
    fn from(array: &Array2<f64>) -> Self {
        Self {
            data: array.iter().cloned().collect(),
            shape: array.raw_dim().into_pattern(),
        }
    }
}

impl Into<Array2<f64>> for SerializableArray2 {
    fn into(self) -> Array2<f64> {
        Array2::from_shape_vec(self.shape, self.data)
            .expect("Failed to reconstruct Array2 from serialized data")
    }
}

/// Serializable classifier parameters
#[derive(Serialize, Deserialize)]
pub struct SerializableClassifier {
    lstm_w_ih: SerializableArray2,
    lstm_w_hh: SerializableArray2,
    lstm_b_ih: SerializableArray2,
    lstm_b_hh: SerializableArray2,
    output_weight: SerializableArray2,
    output_bias: SerializableArray2,
}

impl From<&SequenceClassifier> for SerializableClassifier {
    fn from(model: &SequenceClassifier) -> Self {
        Self {
            lstm_w_ih: (&model.cell.w_ih).into(),
            lstm_w_hh: (&model.cell.w_hh).into(),
            lstm_b_ih: (&model.cell.b_ih).into(),
            lstm_b_hh: (&model.cell.b_hh).into(),
            output_weight: (&model.output.weight).into(),
            output_bias: (&model.output.bias).into(),
        }
    }
}

impl Into<SequenceClassifier> for SerializableClassifier {
    fn into(self) -> SequenceClassifier {
        let cell = LSTMCell::from_parameters(
            self.lstm_w_ih.into(),
            self.lstm_w_hh.into(),
            self.lstm_b_ih.into(),
            self.lstm_b_hh.into(),
        );
        let output = LinearLayer::from_parameters(self.output_weight.into(), self.output_bias.into());
        SequenceClassifier::from_parts(cell, output)
    }
}

/// Model metadata for tracking training information
#[derive(Serialize, Deserialize, Clone)]
pub struct ModelMetadata {
    pub model_name: String,
    pub version: String,
    pub created_at: String,
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_classes: usize,
    pub total_epochs: usize,
    pub final_loss: Option<f64>,
    pub test_accuracy: Option<f64>,
    pub description: Option<String>,
}

/// Complete saved model: parameters, the normalizer the model was trained
/// with (when one was fitted), and metadata
#[derive(Serialize, Deserialize)]
pub struct SavedModel {
    pub classifier: SerializableClassifier,
    pub normalizer: Option<SequenceNormalizer>,
    pub metadata: ModelMetadata,
}

impl SavedModel {
    pub fn into_parts(self) -> (SequenceClassifier, Option<SequenceNormalizer>, ModelMetadata) {
        (self.classifier.into(), self.normalizer, self.metadata)
    }
}

/// Errors that can occur during model persistence operations
#[derive(Debug)]
pub enum PersistenceError {
    IoError(std::io::Error),
    SerializationError(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::IoError(err) => write!(f, "IO error: {}", err),
            PersistenceError::SerializationError(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::IoError(err) => Some(err),
            PersistenceError::SerializationError(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(error: std::io::Error) -> Self {
        PersistenceError::IoError(error)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(error: serde_json::Error) -> Self {
        PersistenceError::SerializationError(error.to_string())
    }
}

impl From<bincode::Error> for PersistenceError {
    fn from(error: bincode::Error) -> Self {
        PersistenceError::SerializationError(error.to_string())
    }
}

/// Model persistence operations
pub struct ModelPersistence;

impl ModelPersistence {
    /// Save model to JSON format (human-readable)
    pub fn save_to_json<P: AsRef<Path>>(
        model: &SavedModel,
        path: P,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(model)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Load model from JSON format
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<SavedModel, PersistenceError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let model = serde_json::from_str(&contents)?;
        Ok(model)
    }

    /// Save model to binary format (compact and fast)
    pub fn save_to_binary<P: AsRef<Path>>(
        model: &SavedModel,
        path: P,
    ) -> Result<(), PersistenceError> {
        let encoded = bincode::serialize(model)?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Load model from binary format
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> Result<SavedModel, PersistenceError> {
        let mut file = File::open(path)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let model = bincode::deserialize(&contents)?;
        Ok(model)
    }

    /// Bundle a classifier with metadata (and optionally its normalizer)
    pub fn create_saved_model(
        model: &SequenceClassifier,
        normalizer: Option<&SequenceNormalizer>,
        model_name: String,
        total_epochs: usize,
        final_loss: Option<f64>,
        test_accuracy: Option<f64>,
        description: Option<String>,
    ) -> SavedModel {
        let metadata = ModelMetadata {
            model_name,
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            input_size: model.input_size,
            hidden_size: model.hidden_size,
            num_classes: model.num_classes,
            total_epochs,
            final_loss,
            test_accuracy,
            description,
        };

        SavedModel {
            classifier: model.into(),
            normalizer: normalizer.cloned(),
            metadata,
        }
    }
}

/// Convenience trait for easy model saving/loading
pub trait PersistentModel {
    /// Save model to file (format determined by file extension)
    fn save<P: AsRef<Path>>(&self, path: P, metadata: ModelMetadata) -> Result<(), PersistenceError>;

    /// Load model from file (format determined by file extension)
    fn load<P: AsRef<Path>>(path: P) -> Result<(Self, ModelMetadata), PersistenceError>
    where
        Self: Sized;
}

impl PersistentModel for SequenceClassifier {
    fn save<P: AsRef<Path>>(&self, path: P, metadata: ModelMetadata) -> Result<(), PersistenceError> {
        let saved_model = SavedModel {
            classifier: self.into(),
            normalizer: None,
            metadata,
        };

        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|s| s.to_str()) {
            Some("json") => ModelPersistence::save_to_json(&saved_model, path),
            _ => ModelPersistence::save_to_binary(&saved_model, path),
        }
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<(Self, ModelMetadata), PersistenceError> {
        let path_ref = path.as_ref();
        let saved_model = match path_ref.extension().and_then(|s| s.to_str()) {
            Some("json") => ModelPersistence::load_from_json(path)?,
            _ => ModelPersistence::load_from_binary(path)?,
        };

        Ok((saved_model.classifier.into(), saved_model.metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_serializable_array_round_trip() {
        let array = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let serializable: SerializableArray2 = (&array).into();
        let back: Array2<f64> = serializable.into();
        assert_eq!(back, array);
    }

    #[test]
    fn test_classifier_snapshot_round_trip() {
        let model = SequenceClassifier::new(1, 4, 6);
        let snapshot: SerializableClassifier = (&model).into();
        let back: SequenceClassifier = snapshot.into();

        assert_eq!(back.input_size, 1);
        assert_eq!(back.hidden_size, 4);
        assert_eq!(back.num_classes, 6);
        assert_eq!(back.cell.w_ih, model.cell.w_ih);
        assert_eq!(back.output.weight, model.output.weight);
    }
}
