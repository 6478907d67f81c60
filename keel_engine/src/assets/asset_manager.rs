/// Asset manager - central registry of loaded and in-flight assets
///
/// Requests are queued by [`AssetManager::load`] and advanced by repeated
/// calls to [`AssetManager::update`] from the thread that owns the manager
/// (normally the render thread). Loaded assets are reference counted; every
/// reference also holds the asset's transitive dependencies.
///
/// Tasks form a stack: a task's dependencies are pushed above it, so they
/// always complete before the task that requested them resumes.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use keel_engine::keel::assets::{AssetManager, AssetType};
/// use keel_engine::keel::files::InternalFileHandleResolver;
///
/// let mut manager = AssetManager::new(Arc::new(InternalFileHandleResolver::new("assets")))?;
/// manager.load("intro.txt", AssetType::Text)?;
/// manager.finish_loading()?;
/// let text = manager.get::<String>("intro.txt")?;
/// # Ok::<(), keel_engine::keel::Error>(())
/// ```

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use rustc_hash::{FxHashMap, FxHashSet};
use crate::assets::loaders::{BinaryLoader, ManifestLoader, TextLoader};
use crate::assets::{
    AssetDescriptor, AssetLoader, AssetLoaderParameters, AssetLoadingTask, AssetObject,
    AssetType, LoadedDependencies, TaskPhase, TaskStep,
};
use crate::async_exec::AsyncExecutor;
use crate::error::{Error, Result};
use crate::files::FileHandleResolver;

const SOURCE: &str = "keel::AssetManager";

/// Receives loading failures instead of the caller of `update()`
pub trait AssetErrorListener: Send + Sync {
    fn error(&self, asset: &AssetDescriptor, error: &Error);
}

/// Asset manager configuration
#[derive(Debug, Clone)]
pub struct AssetManagerConfig {
    /// Worker threads of the background executor
    pub worker_threads: usize,
    /// Base name of the worker threads
    pub thread_name: String,
    /// State-machine steps performed by a single `update()`
    pub tasks_per_update: usize,
    /// Register the built-in text, binary and manifest loaders
    pub default_loaders: bool,
}

impl Default for AssetManagerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            thread_name: "AssetManager".to_string(),
            tasks_per_update: 1,
            default_loaders: true,
        }
    }
}

struct LoadedAsset {
    asset_type: AssetType,
    object: AssetObject,
    ref_count: i32,
}

pub struct AssetManager {
    resolver: Arc<dyn FileHandleResolver>,
    config: AssetManagerConfig,
    executor: AsyncExecutor,
    /// Loaders by asset type, then by file name suffix
    loaders: FxHashMap<AssetType, FxHashMap<String, AssetLoader>>,
    assets: FxHashMap<String, LoadedAsset>,
    asset_dependencies: FxHashMap<String, Vec<String>>,
    queue: VecDeque<AssetDescriptor>,
    tasks: Vec<AssetLoadingTask>,
    listener: Option<Arc<dyn AssetErrorListener>>,
    loaded: usize,
    to_load: usize,
    peak_tasks: usize,
    tasks_created: usize,
}

impl AssetManager {
    /// Create a manager with the default configuration and built-in loaders
    pub fn new(resolver: Arc<dyn FileHandleResolver>) -> Result<Self> {
        Self::with_config(resolver, AssetManagerConfig::default())
    }

    pub fn with_config(resolver: Arc<dyn FileHandleResolver>, config: AssetManagerConfig) -> Result<Self> {
        let executor = AsyncExecutor::new(config.worker_threads, &config.thread_name)?;

        let mut manager = Self {
            resolver: resolver.clone(),
            config,
            executor,
            loaders: FxHashMap::default(),
            assets: FxHashMap::default(),
            asset_dependencies: FxHashMap::default(),
            queue: VecDeque::new(),
            tasks: Vec::new(),
            listener: None,
            loaded: 0,
            to_load: 0,
            peak_tasks: 0,
            tasks_created: 0,
        };

        if manager.config.default_loaders {
            manager.set_loader(AssetType::Text, "", AssetLoader::asynchronous(TextLoader::new(resolver.clone())));
            manager.set_loader(AssetType::Binary, "", AssetLoader::synchronous(BinaryLoader::new(resolver.clone())));
            manager.set_loader(AssetType::Manifest, "", AssetLoader::synchronous(ManifestLoader::new(resolver)));
        }

        Ok(manager)
    }

    pub fn resolver(&self) -> &Arc<dyn FileHandleResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &AssetManagerConfig {
        &self.config
    }

    pub(crate) fn executor(&self) -> &AsyncExecutor {
        &self.executor
    }

    // ===== LOADERS =====

    /// Register `loader` for files of `asset_type` ending with `suffix` ("" matches everything)
    pub fn set_loader(&mut self, asset_type: AssetType, suffix: &str, loader: AssetLoader) {
        crate::engine_debug!(SOURCE, "Loader set: {} -> {:?} (suffix '{}')", asset_type, loader, suffix);
        self.loaders
            .entry(asset_type)
            .or_default()
            .insert(suffix.to_string(), loader);
    }

    /// Loader for `file_name`; the longest matching suffix wins
    pub fn loader(&self, asset_type: AssetType, file_name: &str) -> Option<AssetLoader> {
        let loaders = self.loaders.get(&asset_type)?;
        loaders
            .iter()
            .filter(|(suffix, _)| file_name.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, loader)| loader.clone())
    }

    // ===== REQUESTS =====

    pub fn load(&mut self, file_name: &str, asset_type: AssetType) -> Result<()> {
        self.load_descriptor(AssetDescriptor::new(file_name, asset_type))
    }

    pub fn load_with_params(
        &mut self,
        file_name: &str,
        asset_type: AssetType,
        params: AssetLoaderParameters,
    ) -> Result<()> {
        self.load_descriptor(AssetDescriptor::with_params(file_name, asset_type, params))
    }

    /// Queue a request; it is picked up by a later `update()`
    ///
    /// Fails if an asset with the same name but another type is already
    /// queued, in flight or loaded.
    pub fn load_descriptor(&mut self, descriptor: AssetDescriptor) -> Result<()> {
        let file_name = descriptor.file_name.as_str();
        let asset_type = descriptor.asset_type;

        if self.loader(asset_type, file_name).is_none() {
            crate::engine_bail!(SOURCE, InvalidResource, "No loader for type: {}", asset_type);
        }

        if self.queue.is_empty() {
            self.loaded = 0;
            self.to_load = 0;
            self.peak_tasks = 0;
        }

        if let Some(queued) = self.queue.iter().find(|d| d.file_name == file_name && d.asset_type != asset_type) {
            crate::engine_bail!(
                SOURCE,
                InvalidResource,
                "Asset with name '{}' already in preload queue, but has different type (expected: {}, found: {})",
                file_name,
                asset_type,
                queued.asset_type
            );
        }

        if let Some(task) = self
            .tasks
            .iter()
            .find(|t| t.file_name() == file_name && t.descriptor().asset_type != asset_type)
        {
            crate::engine_bail!(
                SOURCE,
                InvalidResource,
                "Asset with name '{}' already in task list, but has different type (expected: {}, found: {})",
                file_name,
                asset_type,
                task.descriptor().asset_type
            );
        }

        if let Some(loaded) = self.assets.get(file_name) {
            if loaded.asset_type != asset_type {
                crate::engine_bail!(
                    SOURCE,
                    InvalidResource,
                    "Asset with name '{}' already loaded, but has different type (expected: {}, found: {})",
                    file_name,
                    asset_type,
                    loaded.asset_type
                );
            }
        }

        self.to_load += 1;
        crate::engine_debug!(SOURCE, "Queued: {}", descriptor);
        self.queue.push_back(descriptor);
        Ok(())
    }

    // ===== POLLING =====

    /// Advance loading; returns true once everything queued is loaded
    ///
    /// Loading errors are returned here, unless an error listener is set, in
    /// which case the listener is notified and the result tells whether the
    /// queue is empty.
    pub fn update(&mut self) -> Result<bool> {
        let mut finished = false;
        for _ in 0..self.config.tasks_per_update.max(1) {
            match self.step() {
                Ok(done) => {
                    finished = done;
                    if done {
                        break;
                    }
                }
                Err(error) => return self.handle_task_error(error),
            }
        }
        Ok(finished)
    }

    /// Call `update()` until loading finishes or `budget` has elapsed
    pub fn update_for(&mut self, budget: Duration) -> Result<bool> {
        let end = Instant::now() + budget;
        loop {
            let done = self.update()?;
            if done || Instant::now() >= end {
                return Ok(done);
            }
            std::thread::yield_now();
        }
    }

    /// Block until every queued asset is loaded
    pub fn finish_loading(&mut self) -> Result<()> {
        crate::engine_debug!(SOURCE, "Waiting for loading to complete...");
        while !self.update()? {
            std::thread::yield_now();
        }
        crate::engine_debug!(SOURCE, "Loading complete.");
        Ok(())
    }

    /// Block until `file_name` is loaded and return it
    pub fn finish_loading_asset<T: Any + Send + Sync>(&mut self, file_name: &str) -> Result<Arc<T>> {
        crate::engine_debug!(SOURCE, "Waiting for asset to be loaded: {}", file_name);
        loop {
            if self.is_loaded(file_name) {
                crate::engine_debug!(SOURCE, "Asset loaded: {}", file_name);
                return self.get::<T>(file_name);
            }
            if !self.contains(file_name) {
                crate::engine_bail!(SOURCE, InvalidResource, "Asset not loaded: {}", file_name);
            }
            self.update()?;
            std::thread::yield_now();
        }
    }

    fn step(&mut self) -> Result<bool> {
        if self.tasks.is_empty() {
            while !self.queue.is_empty() && self.tasks.is_empty() {
                self.next_task()?;
            }
            if self.tasks.is_empty() {
                return Ok(true);
            }
        }
        Ok(self.update_task()? && self.queue.is_empty() && self.tasks.is_empty())
    }

    fn next_task(&mut self) -> Result<()> {
        let Some(descriptor) = self.queue.pop_front() else {
            return Ok(());
        };

        if self.is_loaded(&descriptor.file_name) {
            crate::engine_debug!(SOURCE, "Already loaded: {}", descriptor);
            if let Some(entry) = self.assets.get_mut(&descriptor.file_name) {
                entry.ref_count += 1;
            }
            self.increment_ref_counted_dependencies(&descriptor.file_name);
            if let Some(callback) = descriptor.loaded_callback() {
                callback(&*self, &descriptor.file_name, descriptor.asset_type);
            }
            self.loaded += 1;
        } else {
            crate::engine_info!(SOURCE, "Loading: {}", descriptor);
            self.add_task(descriptor)?;
        }
        Ok(())
    }

    fn add_task(&mut self, descriptor: AssetDescriptor) -> Result<()> {
        let Some(loader) = self.loader(descriptor.asset_type, &descriptor.file_name) else {
            crate::engine_bail!(SOURCE, InvalidResource, "No loader for type: {}", descriptor.asset_type);
        };
        self.tasks.push(AssetLoadingTask::new(descriptor, loader));
        self.peak_tasks += 1;
        self.tasks_created += 1;
        Ok(())
    }

    /// Run one step of the task on top of the stack; true when it finished
    fn update_task(&mut self) -> Result<bool> {
        let Some(mut task) = self.tasks.pop() else {
            return Ok(true);
        };

        match task.update(self) {
            Ok(TaskStep::Pending) => {
                self.tasks.push(task);
                Ok(false)
            }
            Ok(TaskStep::Dependencies(dependencies)) => {
                let parent = task.file_name().to_string();
                self.tasks.push(task);
                let mut injected = Vec::new();
                let result = self.inject_dependencies(&parent, &dependencies, &mut injected);

                // Queued dependencies may have moved above the parent
                let parent_index = self.tasks.iter().rposition(|t| t.file_name() == parent);
                if let Some(index) = parent_index {
                    self.tasks[index].set_injected(injected);
                }
                if let Err(error) = result {
                    if let Some(index) = parent_index {
                        for abandoned in self.tasks.drain(index + 1..) {
                            abandoned.cancel();
                        }
                    }
                    return Err(error);
                }
                Ok(false)
            }
            Ok(TaskStep::Loaded(asset)) => {
                self.complete_task(task, Some(asset));
                Ok(true)
            }
            Ok(TaskStep::Cancelled) => {
                self.complete_task(task, None);
                Ok(true)
            }
            Err(error) => {
                // Back on the stack so the error handler can find it
                self.tasks.push(task);
                Err(error)
            }
        }
    }

    fn complete_task(&mut self, task: AssetLoadingTask, asset: Option<AssetObject>) {
        if self.tasks.is_empty() {
            self.loaded += 1;
            self.peak_tasks = 0;
        }

        let Some(asset) = asset else {
            crate::engine_debug!(SOURCE, "Cancelled: {}", task.descriptor());
            self.release_injected(&task);
            return;
        };

        let descriptor = task.descriptor().clone();
        let extra = task.extra_references();
        self.assets.insert(
            descriptor.file_name.clone(),
            LoadedAsset {
                asset_type: descriptor.asset_type,
                object: asset,
                ref_count: 1 + extra,
            },
        );
        for _ in 0..extra {
            self.increment_ref_counted_dependencies(&descriptor.file_name);
        }

        if let Some(callback) = descriptor.loaded_callback() {
            callback(&*self, &descriptor.file_name, descriptor.asset_type);
        }

        crate::engine_debug!(
            SOURCE,
            "Loaded: {:.3}ms {}",
            task.elapsed().as_secs_f64() * 1000.0,
            descriptor
        );
    }

    // ===== DEPENDENCIES =====

    /// Inject `dependencies` in order, stopping at the first failure
    ///
    /// `injected` receives the names that were given a reference.
    fn inject_dependencies(
        &mut self,
        parent: &str,
        dependencies: &[AssetDescriptor],
        injected: &mut Vec<String>,
    ) -> Result<()> {
        let mut seen = FxHashSet::default();
        for dependency in dependencies {
            // Later duplicates of a name are ignored
            if !seen.insert(dependency.file_name.clone()) {
                continue;
            }
            self.inject_dependency(parent, dependency)?;
            injected.push(dependency.file_name.clone());
        }
        Ok(())
    }

    fn inject_dependency(&mut self, parent: &str, dependency: &AssetDescriptor) -> Result<()> {
        self.asset_dependencies
            .entry(parent.to_string())
            .or_default()
            .push(dependency.file_name.clone());

        if let Some(entry) = self.assets.get_mut(&dependency.file_name) {
            if entry.asset_type != dependency.asset_type {
                crate::engine_bail!(
                    SOURCE,
                    InvalidResource,
                    "Dependency '{}' of '{}' already loaded as {}, requested as {}",
                    dependency.file_name,
                    parent,
                    entry.asset_type,
                    dependency.asset_type
                );
            }
            crate::engine_debug!(SOURCE, "Dependency already loaded: {}", dependency);
            entry.ref_count += 1;
            self.increment_ref_counted_dependencies(&dependency.file_name);
            return Ok(());
        }

        if let Some(index) = self.tasks.iter().position(|t| t.file_name() == dependency.file_name) {
            let in_flight = &self.tasks[index];
            if in_flight.descriptor().asset_type != dependency.asset_type {
                crate::engine_bail!(
                    SOURCE,
                    InvalidResource,
                    "Dependency '{}' of '{}' already loading as {}, requested as {}",
                    dependency.file_name,
                    parent,
                    in_flight.descriptor().asset_type,
                    dependency.asset_type
                );
            }
            if in_flight.phase() != TaskPhase::AwaitingDependencyDiscovery {
                crate::engine_bail!(
                    SOURCE,
                    InvalidResource,
                    "Circular dependency: '{}' requires '{}' which is still loading",
                    parent,
                    dependency.file_name
                );
            }
            // Not started yet: move it on top so it completes before the parent resumes
            let mut task = self.tasks.remove(index);
            task.add_reference();
            self.tasks.push(task);
            crate::engine_debug!(SOURCE, "Dependency already queued: {}", dependency);
            return Ok(());
        }

        crate::engine_info!(SOURCE, "Loading dependency: {}", dependency);
        self.add_task(dependency.clone())
    }

    fn increment_ref_counted_dependencies(&mut self, parent: &str) {
        let Some(dependencies) = self.asset_dependencies.get(parent).cloned() else {
            return;
        };
        for dependency in dependencies {
            if let Some(entry) = self.assets.get_mut(&dependency) {
                entry.ref_count += 1;
            }
            self.increment_ref_counted_dependencies(&dependency);
        }
    }

    pub(crate) fn snapshot_dependencies(&self, dependencies: &[AssetDescriptor]) -> LoadedDependencies {
        let mut snapshot = LoadedDependencies::default();
        for dependency in dependencies {
            if let Some(entry) = self.assets.get(&dependency.file_name) {
                snapshot.insert(&dependency.file_name, entry.object.clone());
            }
        }
        snapshot
    }

    fn handle_task_error(&mut self, error: Error) -> Result<bool> {
        crate::engine_error!(SOURCE, "Error loading asset: {}", error);

        let Some(task) = self.tasks.pop() else {
            return Err(error);
        };
        let descriptor = task.descriptor().clone();

        // Failed task first, then the rest of the stack from the top
        let mut abandoned: Vec<AssetLoadingTask> = self.tasks.drain(..).collect();
        abandoned.push(task);
        for task in abandoned.iter().rev() {
            task.cancel();
            self.release_injected(task);
        }

        match self.listener.clone() {
            Some(listener) => {
                listener.error(&descriptor, &error);
                Ok(self.queue.is_empty())
            }
            None => Err(error),
        }
    }

    /// Give back the references a task took on its dependencies
    fn release_injected(&mut self, task: &AssetLoadingTask) {
        for dependency in task.injected() {
            if self.is_loaded(dependency) {
                if let Err(unload_error) = self.release(dependency) {
                    crate::engine_warn!(SOURCE, "Couldn't release dependency {}: {}", dependency, unload_error);
                }
            }
        }
        if !self.is_loaded(task.file_name()) {
            self.asset_dependencies.remove(task.file_name());
        }
    }

    // ===== QUERIES =====

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty() && self.tasks.is_empty()
    }

    pub fn is_loaded(&self, file_name: &str) -> bool {
        self.assets.contains_key(file_name)
    }

    pub fn is_loaded_with_type(&self, file_name: &str, asset_type: AssetType) -> bool {
        self.assets
            .get(file_name)
            .map_or(false, |entry| entry.asset_type == asset_type)
    }

    /// Loaded, in flight or queued
    pub fn contains(&self, file_name: &str) -> bool {
        self.is_loaded(file_name)
            || self.tasks.iter().any(|t| t.file_name() == file_name)
            || self.queue.iter().any(|d| d.file_name == file_name)
    }

    pub fn get<T: Any + Send + Sync>(&self, file_name: &str) -> Result<Arc<T>> {
        let object = self.get_object(file_name)?;
        object.downcast::<T>().map_err(|_| {
            crate::engine_err!(
                SOURCE,
                InvalidResource,
                "Asset '{}' is not of the requested type {}",
                file_name,
                std::any::type_name::<T>()
            )
        })
    }

    /// Typed lookup that also checks the descriptor's asset type
    pub fn get_descriptor<T: Any + Send + Sync>(&self, descriptor: &AssetDescriptor) -> Result<Arc<T>> {
        if !self.is_loaded_with_type(&descriptor.file_name, descriptor.asset_type) {
            crate::engine_bail!(SOURCE, InvalidResource, "Asset not loaded: {}", descriptor);
        }
        self.get::<T>(&descriptor.file_name)
    }

    pub fn get_or_none<T: Any + Send + Sync>(&self, file_name: &str) -> Option<Arc<T>> {
        self.assets
            .get(file_name)
            .and_then(|entry| entry.object.clone().downcast::<T>().ok())
    }

    /// Type-erased lookup
    pub fn get_object(&self, file_name: &str) -> Result<AssetObject> {
        match self.assets.get(file_name) {
            Some(entry) => Ok(entry.object.clone()),
            None => Err(crate::engine_err!(SOURCE, InvalidResource, "Asset not loaded: {}", file_name)),
        }
    }

    pub fn asset_type(&self, file_name: &str) -> Option<AssetType> {
        self.assets.get(file_name).map(|entry| entry.asset_type)
    }

    /// Names of all loaded assets, sorted
    pub fn asset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.assets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Direct dependencies recorded for `file_name`
    pub fn dependencies_of(&self, file_name: &str) -> Vec<String> {
        self.asset_dependencies.get(file_name).cloned().unwrap_or_default()
    }

    pub fn reference_count(&self, file_name: &str) -> Result<i32> {
        match self.assets.get(file_name) {
            Some(entry) => Ok(entry.ref_count),
            None => Err(crate::engine_err!(SOURCE, InvalidResource, "Asset not loaded: {}", file_name)),
        }
    }

    pub fn set_reference_count(&mut self, file_name: &str, ref_count: i32) -> Result<()> {
        match self.assets.get_mut(file_name) {
            Some(entry) => {
                entry.ref_count = ref_count;
                Ok(())
            }
            None => Err(crate::engine_err!(SOURCE, InvalidResource, "Asset not loaded: {}", file_name)),
        }
    }

    /// File name of a loaded object, compared by identity
    pub fn file_name_of(&self, asset: &AssetObject) -> Option<String> {
        self.assets
            .iter()
            .find(|(_, entry)| Arc::ptr_eq(&entry.object, asset))
            .map(|(name, _)| name.clone())
    }

    pub fn loaded_assets(&self) -> usize {
        self.assets.len()
    }

    /// Requests still queued or in flight
    pub fn queued_assets(&self) -> usize {
        self.queue.len() + self.tasks.len()
    }

    /// Loading tasks created since this manager was built
    pub fn task_count(&self) -> usize {
        self.tasks_created
    }

    /// Fraction of the current batch already loaded, in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.to_load == 0 {
            return 1.0;
        }
        let mut fraction = self.loaded as f32;
        if self.peak_tasks > 0 {
            fraction += (self.peak_tasks - self.tasks.len().min(self.peak_tasks)) as f32 / self.peak_tasks as f32;
        }
        (fraction / self.to_load as f32).min(1.0)
    }

    pub fn set_error_listener(&mut self, listener: Option<Arc<dyn AssetErrorListener>>) {
        self.listener = listener;
    }

    /// One line per loaded asset: `name, type, refs: N[, deps: [a, b]]`
    pub fn diagnostics(&self) -> String {
        self.asset_names()
            .iter()
            .filter_map(|name| {
                let entry = self.assets.get(name)?;
                let mut line = format!("{}, {}, refs: {}", name, entry.asset_type, entry.ref_count);
                if let Some(dependencies) = self.asset_dependencies.get(name) {
                    line.push_str(&format!(", deps: [{}]", dependencies.join(", ")));
                }
                Some(line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ===== UNLOADING =====

    /// Drop one reference to `file_name`
    ///
    /// Cancels the root task if it loads this asset, or removes a queued
    /// request. Otherwise the reference count is decremented, and the asset is
    /// removed at zero. Each call also releases one reference of every
    /// dependency.
    pub fn unload(&mut self, file_name: &str) -> Result<()> {
        let file_name = file_name.replace('\\', "/");

        if let Some(root) = self.tasks.first() {
            if root.file_name() == file_name {
                crate::engine_info!(SOURCE, "Unload (from tasks): {}", file_name);
                root.cancel();
                root.unload();
                return Ok(());
            }
        }

        if let Some(index) = self.queue.iter().position(|d| d.file_name == file_name) {
            self.to_load = self.to_load.saturating_sub(1);
            let removed = self.queue.remove(index);
            crate::engine_info!(SOURCE, "Unload (from queue): {}", file_name);
            if let Some(descriptor) = removed {
                if self.is_loaded(&file_name) {
                    if let Some(callback) = descriptor.loaded_callback() {
                        callback(&*self, &descriptor.file_name, descriptor.asset_type);
                    }
                }
            }
            return Ok(());
        }

        self.release(&file_name)
    }

    fn release(&mut self, file_name: &str) -> Result<()> {
        let Some(entry) = self.assets.get_mut(file_name) else {
            crate::engine_bail!(SOURCE, InvalidResource, "Asset not loaded: {}", file_name);
        };

        entry.ref_count -= 1;
        let remaining = entry.ref_count;
        if remaining <= 0 {
            crate::engine_info!(SOURCE, "Unload (dispose): {}", file_name);
            self.assets.remove(file_name);
        } else {
            crate::engine_info!(SOURCE, "Unload (decrement): {}", file_name);
        }

        if let Some(dependencies) = self.asset_dependencies.get(file_name).cloned() {
            for dependency in dependencies {
                if self.is_loaded(&dependency) {
                    self.release(&dependency)?;
                }
            }
        }

        if remaining <= 0 {
            self.asset_dependencies.remove(file_name);
        }
        Ok(())
    }

    /// Drop the queue, finish in-flight tasks and unload everything
    pub fn clear(&mut self) -> Result<()> {
        self.queue.clear();
        self.finish_loading()?;

        while !self.assets.is_empty() {
            let mut referenced: FxHashMap<String, usize> = FxHashMap::default();
            let names: Vec<String> = self.assets.keys().cloned().collect();
            for name in &names {
                if let Some(dependencies) = self.asset_dependencies.get(name) {
                    for dependency in dependencies {
                        *referenced.entry(dependency.clone()).or_default() += 1;
                    }
                }
            }

            // Only roots; dependencies go once nothing references them
            for name in &names {
                if !referenced.contains_key(name) && self.is_loaded(name) {
                    self.release(name)?;
                }
            }
        }

        self.assets.clear();
        self.asset_dependencies.clear();
        self.queue.clear();
        self.tasks.clear();
        self.loaded = 0;
        self.to_load = 0;
        self.peak_tasks = 0;
        Ok(())
    }

    /// Unload everything and stop the background executor
    pub fn dispose(&mut self) -> Result<()> {
        crate::engine_debug!(SOURCE, "Disposing.");
        self.clear()?;
        self.executor.dispose();
        Ok(())
    }
}

#[cfg(test)]
#[path = "asset_manager_tests.rs"]
mod tests;
