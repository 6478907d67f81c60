//! Asset loading
//!
//! - [`AssetManager`]: queue, reference counts, dependency graph
//! - [`AssetLoadingTask`]: per-request state machine
//! - [`AssetLoader`]: synchronous or asynchronous loader
//! - [`loaders`]: built-in text, binary and manifest loaders

mod asset_descriptor;
mod asset_loader;
mod asset_loading_task;
mod asset_manager;
pub mod loaders;

#[cfg(test)]
pub(crate) mod mock_loaders;

pub use asset_descriptor::{
    dedup_dependencies, AssetDescriptor, AssetKey, AssetLoaderParameters, AssetObject,
    AssetType, BackgroundData, LoadedCallback,
};
pub use asset_loader::{
    AssetLoader, AssetLoaderBase, AsynchronousAssetLoader, LoadedDependencies,
    SynchronousAssetLoader,
};
pub use asset_loading_task::{AssetLoadingTask, TaskPhase, TaskStep};
pub use asset_manager::{AssetErrorListener, AssetManager, AssetManagerConfig};
