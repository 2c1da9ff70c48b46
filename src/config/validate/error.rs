//! Validation error types

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid loss type: {0} (must be one of: ce, focal, ldam)")]
    InvalidLossType(String),

    #[error("Warm epoch {warm} precedes start epoch {start_epoch} while over-sampling")]
    WarmBeforeStart { warm: usize, start_epoch: usize },

    #[error("Invalid start epoch: {start_epoch} (must be < epochs = {epochs})")]
    InvalidStartEpoch { start_epoch: usize, epochs: usize },

    #[error("Invalid beta: {0} (must be in [0.0, 1.0))")]
    InvalidBeta(f64),

    #[error("Invalid effective-number beta: {0} (must be in [0.0, 1.0])")]
    InvalidEffectiveBeta(f64),

    #[error("Invalid gamma: {0} (must be in [0.0, 1.0])")]
    InvalidGamma(f64),

    #[error("Invalid step size: {0} (must be > 0.0)")]
    InvalidStepSize(f32),

    #[error("Invalid random start radius: {0} (must be >= 0.0)")]
    InvalidRadius(f32),

    #[error("Invalid probability: {0} (must be in [0.0, 1.0])")]
    InvalidProbability(f64),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid momentum: {0} (must be in [0.0, 1.0))")]
    InvalidMomentum(f32),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid imbalance ratio: {0} (must be >= 1.0)")]
    InvalidImbalanceRatio(f64),

    #[error("Invalid validation fraction: {0} (must be in (0.0, 1.0))")]
    InvalidValFraction(f64),

    #[error("Invalid hidden width: {0} (must be > 0)")]
    InvalidHiddenWidth(usize),

    #[error("Invalid normalisation: {0}")]
    InvalidNormalization(String),

    #[error("Class counts cannot be empty")]
    EmptyClassCounts,

    #[error("Class count mismatch: model has {expected} classes, counts cover {actual}")]
    ClassCountMismatch { expected: usize, actual: usize },
}
