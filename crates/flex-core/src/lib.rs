#![deny(missing_docs)]
#![doc = "Shared error taxonomy and capability interfaces for flex experiment tracking."]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod schema;

pub use errors::{CodecOperation, ErrorInfo, FlexError, FlexWarning, InputTarget};
pub use schema::SchemaVersion;

/// Samples and targets as produced by a [`DataLoader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawData<X, Y = X> {
    x: Vec<X>,
    y: Vec<Y>,
}

impl<X, Y> RawData<X, Y> {
    /// Pairs samples with targets; both sides must have the same length.
    pub fn new(x: Vec<X>, y: Vec<Y>) -> Result<Self, FlexError> {
        check_aligned("raw-data-misaligned", x.len(), y.len())?;
        Ok(Self { x, y })
    }

    /// Returns the samples.
    pub fn x(&self) -> &[X] {
        &self.x
    }

    /// Returns the targets.
    pub fn y(&self) -> &[Y] {
        &self.y
    }

    /// Number of sample/target pairs.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Splits the payload back into samples and targets.
    pub fn into_parts(self) -> (Vec<X>, Vec<Y>) {
        (self.x, self.y)
    }
}

/// Model-ready samples and targets as produced by a [`DataPreprocessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data<X, Y = X> {
    x: Vec<X>,
    y: Vec<Y>,
}

impl<X, Y> Data<X, Y> {
    /// Pairs samples with targets; both sides must have the same length.
    pub fn new(x: Vec<X>, y: Vec<Y>) -> Result<Self, FlexError> {
        check_aligned("data-misaligned", x.len(), y.len())?;
        Ok(Self { x, y })
    }

    /// Returns the samples.
    pub fn x(&self) -> &[X] {
        &self.x
    }

    /// Returns the targets.
    pub fn y(&self) -> &[Y] {
        &self.y
    }

    /// Number of sample/target pairs.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn check_aligned(code: &str, x: usize, y: usize) -> Result<(), FlexError> {
    if x != y {
        return Err(FlexError::Shape(
            ErrorInfo::new(code, "samples and targets differ in length")
                .with_context("x", x.to_string())
                .with_context("y", y.to_string()),
        ));
    }
    Ok(())
}

/// Named scores reported by a [`Learner`] after evaluation.
pub type Scores = BTreeMap<String, f64>;

/// Produces raw experiment data.
pub trait DataLoader {
    /// Sample type.
    type X;
    /// Target type.
    type Y;

    /// Loads the raw dataset.
    fn load_data(&mut self) -> Result<RawData<Self::X, Self::Y>, FlexError>;
}

/// Turns raw data into model-ready data.
pub trait DataPreprocessor<X, Y> {
    /// Sample type after preprocessing.
    type Output;

    /// Transforms every sample; targets keep their alignment.
    fn preprocess_data(&self, data: RawData<X, Y>) -> Result<Data<Self::Output, Y>, FlexError>;
}

/// A trainable model with its own persistence.
pub trait Model {
    /// Sample type consumed by the model.
    type Input;
    /// Target type the model is trained against.
    type Target;
    /// Output of a single prediction.
    type Prediction;

    /// Initializes fresh weights.
    fn build(&mut self) -> Result<(), FlexError>;

    /// Restores weights from wherever the model persists them.
    fn load(&mut self) -> Result<(), FlexError>;

    /// Persists the current weights.
    fn save(&self) -> Result<(), FlexError>;

    /// Predicts one output per sample.
    fn predict(
        &self,
        data: &Data<Self::Input, Self::Target>,
    ) -> Result<Vec<Self::Prediction>, FlexError>;
}

/// Fits and evaluates a [`Model`].
pub trait Learner<M: Model> {
    /// Fits `model` on the training split.
    fn train(
        &mut self,
        model: &mut M,
        train_data: &Data<M::Input, M::Target>,
    ) -> Result<(), FlexError>;

    /// Evaluates `model` on the test split.
    fn test(&self, model: &M, test_data: &Data<M::Input, M::Target>) -> Result<Scores, FlexError>;
}
