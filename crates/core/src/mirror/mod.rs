//! Mirror module - the relational read replica and the side channel that
//! keeps it in step with the ledger.

mod memory_mirror;
mod mirror_sync;
mod mirror_traits;

pub use memory_mirror::InMemoryMirrorStore;
pub use mirror_sync::{MirrorMode, MirrorSync};
pub use mirror_traits::{MirrorFilter, MirrorStore};
