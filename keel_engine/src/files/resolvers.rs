/// File handle resolvers
///
/// A resolver maps a logical asset name to a [`FileHandle`]. It must not fail
/// for syntactically valid names; missing files are reported when read.

use std::path::PathBuf;
use std::sync::Arc;
use crate::files::{FileHandle, FileType};

/// Maps logical names to file handles
pub trait FileHandleResolver: Send + Sync {
    fn resolve(&self, file_name: &str) -> FileHandle;
}

/// Resolves names into the internal (read-only asset) storage
#[derive(Debug, Clone)]
pub struct InternalFileHandleResolver {
    root: PathBuf,
}

impl InternalFileHandleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for InternalFileHandleResolver {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileHandleResolver for InternalFileHandleResolver {
    fn resolve(&self, file_name: &str) -> FileHandle {
        FileHandle::new(file_name, FileType::Internal, self.root.clone())
    }
}

/// Resolves names into external (user) storage
#[derive(Debug, Clone)]
pub struct ExternalFileHandleResolver {
    root: PathBuf,
}

impl ExternalFileHandleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileHandleResolver for ExternalFileHandleResolver {
    fn resolve(&self, file_name: &str) -> FileHandle {
        FileHandle::new(file_name, FileType::External, self.root.clone())
    }
}

/// Treats names as absolute host paths
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteFileHandleResolver;

impl FileHandleResolver for AbsoluteFileHandleResolver {
    fn resolve(&self, file_name: &str) -> FileHandle {
        FileHandle::absolute(file_name)
    }
}

/// Resolves names against the directory bundled resources live in
#[derive(Debug, Clone)]
pub struct ClasspathFileHandleResolver {
    root: PathBuf,
}

impl ClasspathFileHandleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileHandleResolver for ClasspathFileHandleResolver {
    fn resolve(&self, file_name: &str) -> FileHandle {
        FileHandle::new(file_name, FileType::Classpath, self.root.clone())
    }
}

/// Prepends a fixed prefix before delegating to another resolver
///
/// The prefix is inserted verbatim; include the trailing `/` if one is wanted.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use keel_engine::keel::files::{
///     FileHandleResolver, InternalFileHandleResolver, PrefixFileHandleResolver,
/// };
///
/// let hd = PrefixFileHandleResolver::new(
///     Arc::new(InternalFileHandleResolver::new("assets")),
///     "hd/",
/// );
/// assert_eq!(hd.resolve("ui/skin.png").path(), "hd/ui/skin.png");
/// ```
#[derive(Clone)]
pub struct PrefixFileHandleResolver {
    base: Arc<dyn FileHandleResolver>,
    prefix: String,
}

impl PrefixFileHandleResolver {
    pub fn new(base: Arc<dyn FileHandleResolver>, prefix: &str) -> Self {
        Self {
            base,
            prefix: prefix.to_string(),
        }
    }

    pub fn base(&self) -> &Arc<dyn FileHandleResolver> {
        &self.base
    }

    pub fn set_base(&mut self, base: Arc<dyn FileHandleResolver>) {
        self.base = base;
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }
}

impl FileHandleResolver for PrefixFileHandleResolver {
    fn resolve(&self, file_name: &str) -> FileHandle {
        self.base.resolve(&format!("{}{}", self.prefix, file_name))
    }
}

#[cfg(test)]
#[path = "resolvers_tests.rs"]
mod tests;
