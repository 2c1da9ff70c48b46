//! Train/eval mode and scoped inference

use super::Classifier;
use std::ops::{Deref, DerefMut};

/// Execution mode of a classifier
///
/// In `Train` mode normalisation layers use batch statistics and update their
/// running estimates; in `Eval` mode they use the running estimates only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

impl Mode {
    pub fn is_training(self) -> bool {
        self == Mode::Train
    }
}

/// Holds a classifier in eval mode for the guard's lifetime
///
/// The previous mode is restored on drop, including on early return or
/// unwinding, so a live network never leaves generation in eval mode.
///
/// ```
/// use equilibrar::model::{Classifier, InferenceGuard, Mlp, MlpConfig, Mode};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let mut net = Mlp::new(&MlpConfig::new(4, 8, 2), &mut rng);
/// {
///     let guard = InferenceGuard::new(&mut net);
///     assert_eq!(guard.mode(), Mode::Eval);
/// }
/// assert_eq!(net.mode(), Mode::Train);
/// ```
pub struct InferenceGuard<'a, M: Classifier + ?Sized> {
    model: &'a mut M,
    previous: Mode,
}

impl<'a, M: Classifier + ?Sized> InferenceGuard<'a, M> {
    /// Switch `model` to eval mode until the guard drops
    pub fn new(model: &'a mut M) -> Self {
        let previous = model.mode();
        model.set_mode(Mode::Eval);
        Self { model, previous }
    }

    /// Mode that will be restored on drop
    pub fn previous(&self) -> Mode {
        self.previous
    }
}

impl<M: Classifier + ?Sized> Deref for InferenceGuard<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: Classifier + ?Sized> DerefMut for InferenceGuard<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.model
    }
}

impl<M: Classifier + ?Sized> Drop for InferenceGuard<'_, M> {
    fn drop(&mut self) {
        self.model.set_mode(self.previous);
    }
}
