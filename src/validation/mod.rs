//! Artifact validation

mod roundtrip;

pub use roundtrip::{validate_artifact, ValidationReport};
