mod error;
mod spec;
mod transform;
mod types;

#[cfg(test)]
mod tests;

pub use error::IrError;
pub use spec::{IrSpec, ResolverOptions};
pub use transform::transform;
pub use types::*;
