/// Asset identity and request types
///
/// An asset is identified by its logical file name plus an explicit
/// [`AssetType`] tag. Loaded objects are stored type-erased and recovered
/// with a checked downcast.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use crate::assets::AssetManager;
use crate::files::FileHandle;

/// Loaded asset object (type-erased, shared)
pub type AssetObject = Arc<dyn Any + Send + Sync>;

/// Data handed from a loader's background phase to its foreground phase
pub type BackgroundData = Box<dyn Any + Send>;

/// Invoked once an asset is available: `(manager, file_name, asset_type)`
pub type LoadedCallback = Arc<dyn Fn(&AssetManager, &str, AssetType) + Send + Sync>;

/// Kind of asset, used to pick a loader and to check requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Text,
    Binary,
    Manifest,
    Texture,
    Pixmap,
    TextureAtlas,
    Music,
    Sound,
    ParticleEffect,
    Model,
    /// Application-defined asset kind
    Custom(&'static str),
}

impl AssetType {
    pub fn name(&self) -> &'static str {
        match self {
            AssetType::Text => "Text",
            AssetType::Binary => "Binary",
            AssetType::Manifest => "Manifest",
            AssetType::Texture => "Texture",
            AssetType::Pixmap => "Pixmap",
            AssetType::TextureAtlas => "TextureAtlas",
            AssetType::Music => "Music",
            AssetType::Sound => "Sound",
            AssetType::ParticleEffect => "ParticleEffect",
            AssetType::Model => "Model",
            AssetType::Custom(name) => *name,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// (file name, type) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub file_name: String,
    pub asset_type: AssetType,
}

/// Per-request loader parameters
#[derive(Clone, Default)]
pub struct AssetLoaderParameters {
    /// Fired when the asset becomes available
    pub loaded_callback: Option<LoadedCallback>,
    /// Loader-specific options, read back with [`AssetLoaderParameters::options`]
    pub options: Option<Arc<dyn Any + Send + Sync>>,
}

impl AssetLoaderParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&AssetManager, &str, AssetType) + Send + Sync + 'static,
    {
        self.loaded_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_options<T: Any + Send + Sync>(mut self, options: T) -> Self {
        self.options = Some(Arc::new(options));
        self
    }

    /// Typed view of the loader options, `None` if absent or of another type
    pub fn options<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.options.as_ref().and_then(|options| options.downcast_ref::<T>())
    }
}

impl fmt::Debug for AssetLoaderParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetLoaderParameters")
            .field("loaded_callback", &self.loaded_callback.is_some())
            .field("options", &self.options.is_some())
            .finish()
    }
}

/// A request for one asset
///
/// Two descriptors are equal when file name and type match; the file handle
/// and parameters do not take part in comparisons.
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    pub file_name: String,
    pub asset_type: AssetType,
    pub file: Option<FileHandle>,
    pub params: Option<AssetLoaderParameters>,
}

impl AssetDescriptor {
    pub fn new(file_name: &str, asset_type: AssetType) -> Self {
        Self {
            file_name: file_name.replace('\\', "/"),
            asset_type,
            file: None,
            params: None,
        }
    }

    pub fn with_params(file_name: &str, asset_type: AssetType, params: AssetLoaderParameters) -> Self {
        Self {
            params: Some(params),
            ..Self::new(file_name, asset_type)
        }
    }

    /// Descriptor for an already resolved file; the file name is its path
    pub fn from_file(file: FileHandle, asset_type: AssetType, params: Option<AssetLoaderParameters>) -> Self {
        Self {
            file_name: file.path().to_string(),
            asset_type,
            file: Some(file),
            params,
        }
    }

    pub fn key(&self) -> AssetKey {
        AssetKey {
            file_name: self.file_name.clone(),
            asset_type: self.asset_type,
        }
    }

    pub(crate) fn loaded_callback(&self) -> Option<LoadedCallback> {
        self.params.as_ref().and_then(|params| params.loaded_callback.clone())
    }
}

impl PartialEq for AssetDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.asset_type == other.asset_type && self.file_name == other.file_name
    }
}

impl Eq for AssetDescriptor {}

impl fmt::Display for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.file_name, self.asset_type)
    }
}

/// Keep the first occurrence of every (file name, type) pair, preserving order
pub fn dedup_dependencies(dependencies: Vec<AssetDescriptor>) -> Vec<AssetDescriptor> {
    let mut seen = rustc_hash::FxHashSet::default();
    dependencies
        .into_iter()
        .filter(|descriptor| seen.insert(descriptor.key()))
        .collect()
}

#[cfg(test)]
#[path = "asset_descriptor_tests.rs"]
mod tests;
