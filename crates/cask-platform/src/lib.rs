//! Platform and architecture descriptors used in Cask artifact names.
//!
//! Both types carry an `Auto` variant that stands for "whatever this host
//! is running". Callers resolve it through `resolve_auto` before building
//! artifact names, so a name never contains an empty segment.

pub use arch::Architecture;
pub use error::{PlatformError, Result};
pub use os::Platform;

mod arch;
mod error;
mod os;
