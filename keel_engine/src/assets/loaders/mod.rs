//! Built-in loaders

mod binary_loader;
mod manifest_loader;
mod text_loader;

pub use binary_loader::BinaryLoader;
pub use manifest_loader::{Manifest, ManifestEntry, ManifestLoader};
pub use text_loader::{TextLoader, TextOptions};
