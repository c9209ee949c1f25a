#![deny(rust_2018_idioms, unsafe_code)]

//! Provisioning of the database objects a schema needs: the database itself,
//! its document and edge collections, and their indexes.

mod creator;
mod error;
mod plan;

pub use creator::{DatabaseObjectCreator, ProvisioningPhase};
pub use error::{ProvisioningError, ProvisioningResult};
pub use plan::{CollectionPlan, ProvisioningPlan};
