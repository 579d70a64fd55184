//! Typed contract for vision-language-model constraint synthesis.
//!
//! A synthesizer looks at a scene image and assigns every object one
//! interaction constraint from a fixed closed set, plus a target-region
//! choice. The model call itself is an opaque external collaborator; this
//! module only fixes the input/output types it must honor.
use crate::error::ReachAvoidError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// Safe interaction type for one object.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// No contact with the object at all.
    NoContact,

    /// Gentle pushing or moving is allowed.
    SoftContact,

    /// Any interaction, including aggressive impact, is allowed.
    AnyContact,

    /// Moving over (on top of) the object is forbidden.
    NoOver,
}

impl ConstraintKind {
    /// The full closed set, in a fixed order.
    pub const ALL: [ConstraintKind; 4] = [
        ConstraintKind::NoContact,
        ConstraintKind::SoftContact,
        ConstraintKind::AnyContact,
        ConstraintKind::NoOver,
    ];
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstraintKind::NoContact => "no_contact",
            ConstraintKind::SoftContact => "soft_contact",
            ConstraintKind::AnyContact => "any_contact",
            ConstraintKind::NoOver => "no_over",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ConstraintKind {
    type Err = ReachAvoidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_contact" => Ok(Self::NoContact),
            "soft_contact" => Ok(Self::SoftContact),
            "any_contact" => Ok(Self::AnyContact),
            "no_over" => Ok(Self::NoOver),
            _ => Err(ReachAvoidError::InvalidConfiguration(format!(
                "unknown constraint kind: {}",
                s
            ))),
        }
    }
}

/// What the synthesizer is asked about.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ConstraintQuery {
    /// Names of the objects in the scene.
    pub objects: Vec<String>,

    /// Candidate target regions to choose from.
    pub target_choices: Vec<String>,

    /// Whether a scene image accompanies the query.
    pub use_image: bool,
}

/// One object paired with its synthesized constraint.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ObjectConstraint {
    /// Object name, as given in the query.
    pub object: String,

    /// Chosen interaction constraint.
    pub kind: ConstraintKind,

    /// Free-text justification for the choice.
    pub explanation: String,
}

/// Structured synthesizer response.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ConstraintPlan {
    /// One constraint per queried object.
    pub constraints: Vec<ObjectConstraint>,

    /// Chosen target region, one of the query's `target_choices`.
    pub target_region: String,

    /// Free-text justification for the target choice.
    pub target_description: String,

    /// Scene description, present when the query carried an image.
    pub image_description: Option<String>,
}

impl ConstraintPlan {
    /// Flattens the plan into log text and an object-to-constraint map.
    pub fn summary(&self) -> (String, HashMap<String, ConstraintKind>) {
        let mut text = String::new();
        let mut constraints = HashMap::new();
        for c in self.constraints.iter() {
            text.push_str(&format!("explanation_obj_{}: {}\n", c.object, c.explanation));
            text.push_str(&format!("{}: {}\n", c.object, c.kind));
            constraints.insert(c.object.clone(), c.kind);
        }
        (text, constraints)
    }
}

/// Synthesizes per-object safety constraints from a scene.
///
/// Implementations wrap a hosted VLM; a refusal or transport failure
/// propagates as an error. The library never inspects the model's reasoning,
/// only the typed plan.
pub trait ConstraintSynthesizer {
    /// Produces a constraint plan for the queried objects.
    fn synthesize(
        &self,
        image: Option<&[u8]>,
        query: &ConstraintQuery,
    ) -> Result<ConstraintPlan>;
}
