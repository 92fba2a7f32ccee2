//! SCA approach selection
//!
//! The [`ApproachRegistry`] answers which approach a new authorisation
//! starts with. The [`ApproachResolver`] answers which approach governs an
//! existing one.

pub mod registry;
pub mod resolver;

pub use registry::ApproachRegistry;
pub use resolver::ApproachResolver;
