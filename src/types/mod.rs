// === TYPES MODULE ===

pub mod crypto;
pub mod requests;

// Re-export commonly used types
pub use crypto::*;
pub use requests::*;
