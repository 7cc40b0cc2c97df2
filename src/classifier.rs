use std::path::Path;

use tract_core::prelude::{SimplePlan, TypedFact, TypedModel, TypedOp};
use tract_onnx::prelude::*;

use crate::error::{InferenceError, ModelError};
use crate::labels::LabelSet;
use crate::models::{Prediction, Probabilities};
use crate::preprocess::{NormalizedTensor, CHANNELS, INPUT_HEIGHT, INPUT_WIDTH};

/// Opaque model: normalized batch in, probability vector out.
///
/// Implementations are loaded once and shared read-only between workers.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError>;
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// ONNX classifier executed with tract.
pub struct OnnxClassifier {
    plan: Plan,
}

impl OnnxClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let load_err = |e: TractError| ModelError::Load {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        };

        let input_shape = tvec!(
            1,
            INPUT_HEIGHT as usize,
            INPUT_WIDTH as usize,
            CHANNELS
        );
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape))
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        Ok(Self { plan })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
        let tensor: Tensor = input.view().to_owned().into();
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::Runtime(format!("{e:#}")))?;

        let first = outputs.first().ok_or(InferenceError::EmptyOutput)?;
        let probs = first
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("{e:#}")))?;
        Ok(probs.iter().copied().collect())
    }
}

/// Index of the largest value; the first one wins on ties. NaN never wins.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, max)| v > max) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Runs the classifier and pairs its output with the label set.
pub fn classify(
    classifier: &dyn Classifier,
    labels: &LabelSet,
    input: &NormalizedTensor,
) -> Result<Prediction, InferenceError> {
    let probs = classifier.predict(input)?;
    if probs.len() != labels.len() {
        return Err(InferenceError::OutputLength {
            expected: labels.len(),
            actual: probs.len(),
        });
    }

    // NaN or inf cannot be written as a JSON number.
    if let Some(index) = probs.iter().position(|p| !p.is_finite()) {
        return Err(InferenceError::NonFinite { index });
    }

    let index = argmax(&probs).ok_or(InferenceError::EmptyOutput)?;
    let predicted_class = labels.get(index).unwrap_or_default().to_string();
    let probabilities = Probabilities::new(
        labels
            .iter()
            .map(str::to_string)
            .zip(probs.iter().copied())
            .collect(),
    );

    Ok(Prediction {
        predicted_class,
        probabilities,
    })
}
