/// Per-request loading state machine
///
/// A task drives one loader from dependency discovery to a finished asset.
/// The manager pops the task, calls [`AssetLoadingTask::update`] and reacts
/// to the returned [`TaskStep`]; the task never mutates the manager itself.
///
/// Asynchronous loaders run their dependency discovery and background phase
/// on the manager's executor. At most one background submission is
/// outstanding per task, and it is only ever polled with `is_done()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::assets::{
    dedup_dependencies, AssetDescriptor, AssetLoader, AssetLoaderParameters,
    AssetManager, AssetObject, AsynchronousAssetLoader, BackgroundData,
    LoadedDependencies,
};
use crate::async_exec::{AsyncResult, AsyncTask};
use crate::error::Result;
use crate::files::FileHandle;

const DEPENDENCIES_FAILED: &str = "Couldn't load dependencies of asset";
const LOAD_FAILED: &str = "Couldn't load asset";

/// Observable phase of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    AwaitingDependencyDiscovery,
    DiscoveringDependencies,
    AwaitingDependencyCompletion,
    AwaitingBackgroundWork,
    AwaitingForegroundFinalization,
    Complete,
    Cancelled,
}

/// Result of one `update()` call
pub enum TaskStep {
    /// Nothing to report yet, poll again
    Pending,
    /// Dependencies to inject before this task can continue (deduplicated)
    Dependencies(Vec<AssetDescriptor>),
    /// The asset is ready
    Loaded(AssetObject),
    /// The task was cancelled; no asset will be produced
    Cancelled,
}

/// Outcome of a background submission
pub(crate) enum BackgroundOutcome {
    Dependencies(Vec<AssetDescriptor>),
    Prepared(BackgroundData),
    Cancelled,
}

enum TaskState {
    AwaitingDependencyDiscovery,
    DiscoveringDependencies(AsyncResult<BackgroundOutcome>),
    AwaitingDependencyCompletion,
    AwaitingBackgroundWork(AsyncResult<BackgroundOutcome>),
    AwaitingForegroundFinalization(BackgroundData),
    Complete,
    Cancelled,
}

enum BackgroundMode {
    /// Discover dependencies; when there are none, run the background load too
    DiscoverThenLoad,
    Load(LoadedDependencies),
}

/// Work submitted to the executor on behalf of an asynchronous loader
struct BackgroundUnit {
    mode: BackgroundMode,
    loader: Arc<dyn AsynchronousAssetLoader>,
    file_name: String,
    file: FileHandle,
    params: Option<AssetLoaderParameters>,
    cancel: Arc<AtomicBool>,
}

impl AsyncTask<BackgroundOutcome> for BackgroundUnit {
    fn call(self) -> Result<BackgroundOutcome> {
        if self.cancel.load(Ordering::Acquire) {
            return Ok(BackgroundOutcome::Cancelled);
        }

        let dependencies = match self.mode {
            BackgroundMode::DiscoverThenLoad => {
                let found = self.loader.dependencies(&self.file_name, &self.file, self.params.as_ref())?;
                if !found.is_empty() {
                    return Ok(BackgroundOutcome::Dependencies(found));
                }
                LoadedDependencies::default()
            }
            BackgroundMode::Load(dependencies) => dependencies,
        };

        let data = self.loader.load_async(&dependencies, &self.file_name, &self.file, self.params.as_ref())?;
        Ok(BackgroundOutcome::Prepared(data))
    }
}

pub struct AssetLoadingTask {
    descriptor: AssetDescriptor,
    file: FileHandle,
    loader: AssetLoader,
    state: TaskState,
    dependencies: Vec<AssetDescriptor>,
    injected: Vec<String>,
    cancel: Arc<AtomicBool>,
    background_submitted: bool,
    extra_references: i32,
    start: Instant,
}

impl AssetLoadingTask {
    /// Create a task; the file is resolved through the loader if the descriptor has none
    pub fn new(descriptor: AssetDescriptor, loader: AssetLoader) -> Self {
        let file = match &descriptor.file {
            Some(file) => file.clone(),
            None => loader.resolve(&descriptor.file_name),
        };

        Self {
            descriptor,
            file,
            loader,
            state: TaskState::AwaitingDependencyDiscovery,
            dependencies: Vec::new(),
            injected: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            background_submitted: false,
            extra_references: 0,
            start: Instant::now(),
        }
    }

    pub fn descriptor(&self) -> &AssetDescriptor {
        &self.descriptor
    }

    pub fn file_name(&self) -> &str {
        &self.descriptor.file_name
    }

    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    pub fn phase(&self) -> TaskPhase {
        match self.state {
            TaskState::AwaitingDependencyDiscovery => TaskPhase::AwaitingDependencyDiscovery,
            TaskState::DiscoveringDependencies(_) => TaskPhase::DiscoveringDependencies,
            TaskState::AwaitingDependencyCompletion => TaskPhase::AwaitingDependencyCompletion,
            TaskState::AwaitingBackgroundWork(_) => TaskPhase::AwaitingBackgroundWork,
            TaskState::AwaitingForegroundFinalization(_) => TaskPhase::AwaitingForegroundFinalization,
            TaskState::Complete => TaskPhase::Complete,
            TaskState::Cancelled => TaskPhase::Cancelled,
        }
    }

    /// Dependencies injected for this task (empty until discovered)
    pub fn dependencies(&self) -> &[AssetDescriptor] {
        &self.dependencies
    }

    /// Dependencies the manager took a reference on for this task
    pub(crate) fn injected(&self) -> &[String] {
        &self.injected
    }

    pub(crate) fn set_injected(&mut self, names: Vec<String>) {
        self.injected = names;
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// True once any background unit was handed to the executor
    pub fn has_submitted_background_work(&self) -> bool {
        self.background_submitted
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Another requester is waiting for this asset
    pub(crate) fn add_reference(&mut self) {
        self.extra_references += 1;
    }

    pub(crate) fn extra_references(&self) -> i32 {
        self.extra_references
    }

    /// True while a background unit submitted by this task is still running
    pub fn has_outstanding_work(&mut self) -> bool {
        match &mut self.state {
            TaskState::DiscoveringDependencies(pending) | TaskState::AwaitingBackgroundWork(pending) => {
                !pending.is_done()
            }
            _ => false,
        }
    }

    /// Advance the state machine by one step
    ///
    /// Never blocks on background work. A cancelled task stays `Pending`
    /// until its running background unit returns, so the loader never sees
    /// two units at once.
    pub fn update(&mut self, manager: &AssetManager) -> Result<TaskStep> {
        if self.is_cancelled() {
            if self.has_outstanding_work() {
                return Ok(TaskStep::Pending);
            }
            self.state = TaskState::Cancelled;
            return Ok(TaskStep::Cancelled);
        }

        match self.loader.clone() {
            AssetLoader::Synchronous(loader) => self.update_sync(manager, loader.as_ref()),
            AssetLoader::Asynchronous(loader) => self.update_async(manager, loader),
        }
    }

    fn update_sync(
        &mut self,
        manager: &AssetManager,
        loader: &dyn crate::assets::SynchronousAssetLoader,
    ) -> Result<TaskStep> {
        let file_name = self.descriptor.file_name.clone();
        let params = self.descriptor.params.clone();

        match self.state {
            TaskState::AwaitingDependencyDiscovery => {
                let found = loader
                    .dependencies(&file_name, &self.file, params.as_ref())
                    .map_err(|e| e.for_asset(&file_name, DEPENDENCIES_FAILED))?;

                if found.is_empty() {
                    return self.finish_sync(manager, loader);
                }

                self.dependencies = dedup_dependencies(found);
                self.state = TaskState::AwaitingDependencyCompletion;
                Ok(TaskStep::Dependencies(self.dependencies.clone()))
            }
            TaskState::AwaitingDependencyCompletion => {
                if !self.dependencies_loaded(manager) {
                    return Ok(TaskStep::Pending);
                }
                self.finish_sync(manager, loader)
            }
            TaskState::Cancelled => Ok(TaskStep::Cancelled),
            _ => Ok(TaskStep::Pending),
        }
    }

    fn finish_sync(
        &mut self,
        manager: &AssetManager,
        loader: &dyn crate::assets::SynchronousAssetLoader,
    ) -> Result<TaskStep> {
        let file_name = self.descriptor.file_name.clone();
        let asset = loader
            .load(manager, &file_name, &self.file, self.descriptor.params.as_ref())
            .map_err(|e| e.for_asset(&file_name, LOAD_FAILED))?;
        self.state = TaskState::Complete;
        Ok(TaskStep::Loaded(asset))
    }

    fn update_async(
        &mut self,
        manager: &AssetManager,
        loader: Arc<dyn AsynchronousAssetLoader>,
    ) -> Result<TaskStep> {
        let file_name = self.descriptor.file_name.clone();

        loop {
            match std::mem::replace(&mut self.state, TaskState::Cancelled) {
                TaskState::AwaitingDependencyDiscovery => {
                    let pending = self.submit(manager, loader.clone(), BackgroundMode::DiscoverThenLoad)?;
                    self.state = TaskState::DiscoveringDependencies(pending);
                    return Ok(TaskStep::Pending);
                }
                TaskState::DiscoveringDependencies(mut pending) => {
                    if !pending.is_done() {
                        self.state = TaskState::DiscoveringDependencies(pending);
                        return Ok(TaskStep::Pending);
                    }
                    match pending.get().map_err(|e| e.for_asset(&file_name, DEPENDENCIES_FAILED))? {
                        Some(BackgroundOutcome::Dependencies(found)) => {
                            self.dependencies = dedup_dependencies(found);
                            self.state = TaskState::AwaitingDependencyCompletion;
                            return Ok(TaskStep::Dependencies(self.dependencies.clone()));
                        }
                        Some(BackgroundOutcome::Prepared(data)) => {
                            self.state = TaskState::AwaitingForegroundFinalization(data);
                        }
                        Some(BackgroundOutcome::Cancelled) | None => {
                            return Ok(TaskStep::Cancelled);
                        }
                    }
                }
                TaskState::AwaitingDependencyCompletion => {
                    if !self.dependencies_loaded(manager) {
                        self.state = TaskState::AwaitingDependencyCompletion;
                        return Ok(TaskStep::Pending);
                    }
                    let snapshot = manager.snapshot_dependencies(&self.dependencies);
                    let pending = self.submit(manager, loader.clone(), BackgroundMode::Load(snapshot))?;
                    self.state = TaskState::AwaitingBackgroundWork(pending);
                    return Ok(TaskStep::Pending);
                }
                TaskState::AwaitingBackgroundWork(mut pending) => {
                    if !pending.is_done() {
                        self.state = TaskState::AwaitingBackgroundWork(pending);
                        return Ok(TaskStep::Pending);
                    }
                    match pending.get().map_err(|e| e.for_asset(&file_name, LOAD_FAILED))? {
                        Some(BackgroundOutcome::Prepared(data)) => {
                            self.state = TaskState::AwaitingForegroundFinalization(data);
                        }
                        Some(BackgroundOutcome::Dependencies(_)) => {
                            crate::engine_bail!(
                                "keel::AssetLoadingTask",
                                BackendError,
                                "Background load of {} reported dependencies",
                                file_name
                            );
                        }
                        Some(BackgroundOutcome::Cancelled) | None => {
                            return Ok(TaskStep::Cancelled);
                        }
                    }
                }
                TaskState::AwaitingForegroundFinalization(data) => {
                    let asset = loader
                        .load_sync(manager, &file_name, &self.file, self.descriptor.params.as_ref(), data)
                        .map_err(|e| e.for_asset(&file_name, LOAD_FAILED))?;
                    self.state = TaskState::Complete;
                    return Ok(TaskStep::Loaded(asset));
                }
                TaskState::Complete => {
                    self.state = TaskState::Complete;
                    return Ok(TaskStep::Pending);
                }
                TaskState::Cancelled => return Ok(TaskStep::Cancelled),
            }
        }
    }

    fn submit(
        &mut self,
        manager: &AssetManager,
        loader: Arc<dyn AsynchronousAssetLoader>,
        mode: BackgroundMode,
    ) -> Result<AsyncResult<BackgroundOutcome>> {
        let unit = BackgroundUnit {
            mode,
            loader,
            file_name: self.descriptor.file_name.clone(),
            file: self.file.clone(),
            params: self.descriptor.params.clone(),
            cancel: self.cancel.clone(),
        };
        let pending = manager.executor().submit(unit)?;
        self.background_submitted = true;
        crate::engine_trace!(
            "keel::AssetLoadingTask",
            "Submitted background work for {}",
            self.descriptor
        );
        Ok(pending)
    }

    fn dependencies_loaded(&self, manager: &AssetManager) -> bool {
        self.dependencies
            .iter()
            .all(|dependency| manager.is_loaded(&dependency.file_name))
    }

    /// Let an asynchronous loader release intermediate resources
    ///
    /// Does nothing unless background work was actually started.
    pub fn unload(&self) {
        if let AssetLoader::Asynchronous(loader) = &self.loader {
            if self.background_submitted {
                loader.unload_async(
                    &self.descriptor.file_name,
                    &self.file,
                    self.descriptor.params.as_ref(),
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "asset_loading_task_tests.rs"]
mod tests;
