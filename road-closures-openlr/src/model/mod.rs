mod accuracy_report;
mod closure;
mod encoded_reference;
mod format;
mod reference_statistics;
mod regeneration_report;

pub mod geometry_ops;

pub use accuracy_report::AccuracyReport;
pub use closure::{ClosureId, ClosureRecord, ClosureStore, MemoryClosureStore};
pub use encoded_reference::EncodedReference;
pub use format::Format;
pub use reference_statistics::ReferenceStatistics;
pub use regeneration_report::RegenerationReport;
