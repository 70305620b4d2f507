/// A marker type indicating that a model is **not yet trained**.
///
/// Used in generic parameters (e.g. `FeedForwardModel<Unfitted>`) so that:
/// - Training methods (like `Trainer::fit`) require an `Unfitted` model.
/// - Inference methods (`predict`) are not available until the model is
///   converted to `Fitted`.
#[derive(Clone, Copy, Debug)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model contains only inference parameters: no optimizer state,
/// dropout masks, random generator or training hyperparameters.
#[derive(Clone, Copy, Debug)]
pub struct Fitted;
