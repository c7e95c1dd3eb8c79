pub mod classifier;
pub mod network;

pub use classifier::Classifier;
pub use network::Network;
