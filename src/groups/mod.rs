//! Group bookkeeping: descriptors for every group and the slot table that
//! maps names and numbers onto dense capture slots.

pub mod registry;
pub mod slots;

pub use registry::{GroupDescriptor, GroupKind, GroupRegistry};
pub use slots::SlotTable;
