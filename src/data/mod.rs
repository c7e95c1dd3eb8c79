pub mod batch;
pub mod idx;
pub mod image_folder;
pub mod in_memory;
pub mod synthetic;

pub use batch::{Batch, BatchSource, Split};
pub use in_memory::{Dataset, InMemorySource};
