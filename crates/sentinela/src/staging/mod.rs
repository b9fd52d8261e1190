//! Staging (quarantine) review: classification, metadata entry, validation.

pub mod classifier;
pub mod review;
pub mod validation;

pub use classifier::{
    infer_classification, ClassifierState, Field, MetadataDraft, StagingClassifier, SubmitError,
    TransitionError,
};
pub use review::{StagingReview, TextPreview};
pub use validation::{required_fields, ValidationError};
