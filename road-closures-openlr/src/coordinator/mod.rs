mod reference_coordinator;
pub mod regeneration;

pub use reference_coordinator::{CoordinatorInfo, EncodedWay, ReferenceCoordinator};
pub use regeneration::RegenerationOptions;
