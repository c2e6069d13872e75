#![deny(missing_docs)]
#![doc = "Shared error, provenance and seeding types for preheating model specifications."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, ModelError};
pub use provenance::{SchemaVersion, SpecProvenance};
pub use rng::{derive_run_seed, RngHandle, DETERMINISTIC_SEED};
