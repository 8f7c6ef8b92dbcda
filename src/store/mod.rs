pub mod disk;
pub mod memory;

pub use disk::FjallItemStore;
pub use memory::MemoryItemStore;
