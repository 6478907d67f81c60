/// Asset loader traits
///
/// A loader comes in one of two shapes:
/// - [`SynchronousAssetLoader`]: everything happens on the polling thread
/// - [`AsynchronousAssetLoader`]: a background phase (`load_async`, no GPU
///   access) followed by a foreground phase (`load_sync`) on the polling thread
///
/// [`AssetLoader`] is the closed variant the loading task dispatches on.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::assets::{AssetDescriptor, AssetLoaderParameters, AssetManager, AssetObject, BackgroundData};
use crate::error::Result;
use crate::files::{FileHandle, FileHandleResolver};

/// Behavior shared by both loader shapes
pub trait AssetLoaderBase: Send + Sync {
    /// Resolver used when a descriptor carries no file handle
    fn resolver(&self) -> &Arc<dyn FileHandleResolver>;

    fn resolve(&self, file_name: &str) -> FileHandle {
        self.resolver().resolve(file_name)
    }

    /// Assets that must be loaded before this one; empty when there are none
    ///
    /// For asynchronous loaders this runs on a worker thread.
    fn dependencies(
        &self,
        _file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<Vec<AssetDescriptor>> {
        Ok(Vec::new())
    }
}

pub trait SynchronousAssetLoader: AssetLoaderBase {
    fn load(
        &self,
        manager: &AssetManager,
        file_name: &str,
        file: &FileHandle,
        params: Option<&AssetLoaderParameters>,
    ) -> Result<AssetObject>;
}

pub trait AsynchronousAssetLoader: AssetLoaderBase {
    /// Background phase. Must not touch GPU state.
    fn load_async(
        &self,
        dependencies: &LoadedDependencies,
        file_name: &str,
        file: &FileHandle,
        params: Option<&AssetLoaderParameters>,
    ) -> Result<BackgroundData>;

    /// Foreground phase, consumes what `load_async` produced
    fn load_sync(
        &self,
        manager: &AssetManager,
        file_name: &str,
        file: &FileHandle,
        params: Option<&AssetLoaderParameters>,
        data: BackgroundData,
    ) -> Result<AssetObject>;

    /// Release intermediate resources of an abandoned load
    fn unload_async(
        &self,
        _file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) {
    }
}

/// A registered loader
#[derive(Clone)]
pub enum AssetLoader {
    Synchronous(Arc<dyn SynchronousAssetLoader>),
    Asynchronous(Arc<dyn AsynchronousAssetLoader>),
}

impl AssetLoader {
    pub fn synchronous<L: SynchronousAssetLoader + 'static>(loader: L) -> Self {
        AssetLoader::Synchronous(Arc::new(loader))
    }

    pub fn asynchronous<L: AsynchronousAssetLoader + 'static>(loader: L) -> Self {
        AssetLoader::Asynchronous(Arc::new(loader))
    }

    pub fn is_asynchronous(&self) -> bool {
        matches!(self, AssetLoader::Asynchronous(_))
    }

    pub fn resolve(&self, file_name: &str) -> FileHandle {
        match self {
            AssetLoader::Synchronous(loader) => loader.resolve(file_name),
            AssetLoader::Asynchronous(loader) => loader.resolve(file_name),
        }
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetLoader::Synchronous(_) => f.write_str("AssetLoader::Synchronous"),
            AssetLoader::Asynchronous(_) => f.write_str("AssetLoader::Asynchronous"),
        }
    }
}

/// Snapshot of the already loaded dependencies of an asset
///
/// Handed to `load_async` in place of the manager, which stays on the
/// polling thread.
#[derive(Clone, Default)]
pub struct LoadedDependencies {
    assets: FxHashMap<String, AssetObject>,
}

impl LoadedDependencies {
    pub(crate) fn insert(&mut self, file_name: &str, asset: AssetObject) {
        self.assets.insert(file_name.to_string(), asset);
    }

    pub fn get<T: std::any::Any + Send + Sync>(&self, file_name: &str) -> Option<Arc<T>> {
        self.assets
            .get(file_name)
            .cloned()
            .and_then(|asset| asset.downcast::<T>().ok())
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.assets.contains_key(file_name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
