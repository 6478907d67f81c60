/// Mock loaders for unit tests (no files required)
///
/// Both loaders keep their dependency table in memory and record every call
/// into a shared log so tests can assert on ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use crossbeam_channel::Receiver;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::assets::{
    AssetDescriptor, AssetLoaderBase, AssetLoaderParameters, AssetManager, AssetObject,
    AssetType, AsynchronousAssetLoader, BackgroundData, LoadedDependencies,
    SynchronousAssetLoader,
};
use crate::error::{Error, Result};
use crate::files::{FileHandle, FileHandleResolver, InternalFileHandleResolver};

pub const MOCK: AssetType = AssetType::Custom("Mock");
pub const MOCK_ASYNC: AssetType = AssetType::Custom("MockAsync");

/// Shared call log
pub type CallLog = Arc<Mutex<Vec<String>>>;

fn record(log: &CallLog, call: String) {
    log.lock().unwrap().push(call);
}

// ============================================================================
// Mock Synchronous Loader
// ============================================================================

pub struct MockSyncLoader {
    resolver: Arc<dyn FileHandleResolver>,
    dependencies: FxHashMap<String, Vec<AssetDescriptor>>,
    failing: FxHashSet<String>,
    pub calls: CallLog,
}

impl MockSyncLoader {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(InternalFileHandleResolver::default()),
            dependencies: FxHashMap::default(),
            failing: FxHashSet::default(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_dependencies(mut self, file_name: &str, dependencies: &[(&str, AssetType)]) -> Self {
        self.dependencies.insert(
            file_name.to_string(),
            dependencies
                .iter()
                .map(|(name, asset_type)| AssetDescriptor::new(name, *asset_type))
                .collect(),
        );
        self
    }

    pub fn failing(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    pub fn with_log(mut self, calls: CallLog) -> Self {
        self.calls = calls;
        self
    }
}

impl AssetLoaderBase for MockSyncLoader {
    fn resolver(&self) -> &Arc<dyn FileHandleResolver> {
        &self.resolver
    }

    fn dependencies(
        &self,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<Vec<AssetDescriptor>> {
        record(&self.calls, format!("deps:{}", file_name));
        Ok(self.dependencies.get(file_name).cloned().unwrap_or_default())
    }
}

impl SynchronousAssetLoader for MockSyncLoader {
    fn load(
        &self,
        manager: &AssetManager,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<AssetObject> {
        record(&self.calls, format!("load:{}", file_name));
        for dependency in self.dependencies.get(file_name).into_iter().flatten() {
            if !manager.is_loaded(&dependency.file_name) {
                return Err(Error::BackendError(format!(
                    "dependency {} not loaded",
                    dependency.file_name
                )));
            }
        }
        if self.failing.contains(file_name) {
            return Err(Error::Io(format!("mock failure: {}", file_name)));
        }
        Ok(Arc::new(format!("sync:{}", file_name)))
    }
}

// ============================================================================
// Mock Asynchronous Loader
// ============================================================================

pub struct MockAsyncLoader {
    resolver: Arc<dyn FileHandleResolver>,
    dependencies: FxHashMap<String, Vec<AssetDescriptor>>,
    failing: FxHashSet<String>,
    gate: Option<Receiver<()>>,
    delay: Option<Duration>,
    pub calls: CallLog,
    /// `load_async` calls currently running
    pub active: Arc<AtomicUsize>,
    /// Highest value `active` ever reached
    pub peak: Arc<AtomicUsize>,
}

impl MockAsyncLoader {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(InternalFileHandleResolver::default()),
            dependencies: FxHashMap::default(),
            failing: FxHashSet::default(),
            gate: None,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_dependencies(mut self, file_name: &str, dependencies: &[(&str, AssetType)]) -> Self {
        self.dependencies.insert(
            file_name.to_string(),
            dependencies
                .iter()
                .map(|(name, asset_type)| AssetDescriptor::new(name, *asset_type))
                .collect(),
        );
        self
    }

    pub fn failing(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// `load_async` waits for a message (or a dropped sender) before running
    pub fn with_gate(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// `load_async` sleeps this long before returning
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_log(mut self, calls: CallLog) -> Self {
        self.calls = calls;
        self
    }
}

impl AssetLoaderBase for MockAsyncLoader {
    fn resolver(&self) -> &Arc<dyn FileHandleResolver> {
        &self.resolver
    }

    fn dependencies(
        &self,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<Vec<AssetDescriptor>> {
        record(&self.calls, format!("deps:{}", file_name));
        Ok(self.dependencies.get(file_name).cloned().unwrap_or_default())
    }
}

impl AsynchronousAssetLoader for MockAsyncLoader {
    fn load_async(
        &self,
        dependencies: &LoadedDependencies,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<BackgroundData> {
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        record(&self.calls, format!("load_async:{}", file_name));
        for dependency in self.dependencies.get(file_name).into_iter().flatten() {
            if !dependencies.contains(&dependency.file_name) {
                return Err(Error::BackendError(format!(
                    "dependency {} missing from snapshot",
                    dependency.file_name
                )));
            }
        }
        if self.failing.contains(file_name) {
            return Err(Error::Io(format!("mock failure: {}", file_name)));
        }
        Ok(Box::new(format!("async:{}", file_name)))
    }

    fn load_sync(
        &self,
        _manager: &AssetManager,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
        data: BackgroundData,
    ) -> Result<AssetObject> {
        record(&self.calls, format!("load_sync:{}", file_name));
        let value = data
            .downcast::<String>()
            .map_err(|_| Error::BackendError("unexpected background data".to_string()))?;
        Ok(Arc::new(*value))
    }

    fn unload_async(
        &self,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) {
        record(&self.calls, format!("unload_async:{}", file_name));
    }
}

/// Manager without built-in loaders
pub fn test_manager() -> AssetManager {
    AssetManager::with_config(
        Arc::new(InternalFileHandleResolver::default()),
        crate::assets::AssetManagerConfig {
            default_loaders: false,
            ..Default::default()
        },
    )
    .unwrap()
}

/// Snapshot of a call log
pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
