use std::fmt;

use thiserror::Error;

use crate::model::ClassificationBranch;
use crate::staging::classifier::{Field, MetadataDraft};

/// Metadata that does not satisfy its branch's requirements.
///
/// Lists every problem at once so the operator can fix them in one pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub branch: ClassificationBranch,
    pub missing: Vec<Field>,
    pub invalid: Vec<(Field, String)>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} metadata is incomplete", self.branch)?;
        if !self.missing.is_empty() {
            let names: Vec<&str> = self.missing.iter().map(Field::as_str).collect();
            write!(f, "; missing: {}", names.join(", "))?;
        }
        for (field, reason) in &self.invalid {
            write!(f, "; invalid {}: {}", field, reason)?;
        }
        Ok(())
    }
}

/// Fields that must be filled in for a branch.
pub fn required_fields(branch: ClassificationBranch) -> &'static [Field] {
    match branch {
        ClassificationBranch::Legislation => &[
            Field::Sphere,
            Field::DocType,
            Field::PublicationDate,
            Field::Ementa,
        ],
        ClassificationBranch::Generic => &[Field::Description],
    }
}

/// Checks required fields and parseable values. Whitespace-only counts as
/// empty.
pub fn validate(
    branch: ClassificationBranch,
    draft: &MetadataDraft,
) -> Result<(), ValidationError> {
    let missing: Vec<Field> = required_fields(branch)
        .iter()
        .copied()
        .filter(|field| draft.get(*field).trim().is_empty())
        .collect();

    let mut invalid = Vec::new();
    let sphere = draft.sphere.trim();
    if !sphere.is_empty() {
        if let Err(reason) = sphere.parse::<crate::model::Sphere>() {
            invalid.push((Field::Sphere, reason));
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            branch,
            missing,
            invalid,
        })
    }
}
