/// File handle: a logical path plus the storage it lives in
///
/// Paths always use `/` separators. Creating a handle never touches the
/// file system; existence is checked when the handle is read.

use std::fmt;
use std::path::PathBuf;
use crate::error::{Error, Result};

/// Storage a file handle points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Read-only resources bundled with the application code
    Classpath,
    /// Read-only application assets
    Internal,
    /// User storage (documents, saves)
    External,
    /// Absolute path on the host file system
    Absolute,
    /// Application private writable storage
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    path: String,
    file_type: FileType,
    root: PathBuf,
}

impl FileHandle {
    /// Create a handle for `path` inside `root`
    ///
    /// `root` is ignored for [`FileType::Absolute`] handles.
    pub fn new(path: &str, file_type: FileType, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.replace('\\', "/"),
            file_type,
            root: root.into(),
        }
    }

    /// Absolute handle (no root)
    pub fn absolute(path: &str) -> Self {
        Self::new(path, FileType::Absolute, PathBuf::new())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        match self.path.rfind('/') {
            Some(index) => &self.path[index + 1..],
            None => &self.path,
        }
    }

    /// Extension of the last segment without the dot, or "" if there is none
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) => &name[index + 1..],
            None => "",
        }
    }

    pub fn name_without_extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(index) => &name[..index],
            None => name,
        }
    }

    /// Path with the extension removed (directories kept)
    pub fn path_without_extension(&self) -> &str {
        let name_start = self.path.rfind('/').map_or(0, |index| index + 1);
        match self.path[name_start..].rfind('.') {
            Some(index) => &self.path[..name_start + index],
            None => &self.path,
        }
    }

    /// Host path this handle reads from
    pub fn file_path(&self) -> PathBuf {
        match self.file_type {
            FileType::Absolute => PathBuf::from(&self.path),
            _ => self.root.join(&self.path),
        }
    }

    /// Handle of the containing directory ("" for top-level entries)
    pub fn parent(&self) -> FileHandle {
        let parent = match self.path.rfind('/') {
            Some(0) if self.file_type == FileType::Absolute => "/",
            Some(index) => &self.path[..index],
            None => "",
        };
        Self {
            path: parent.to_string(),
            file_type: self.file_type,
            root: self.root.clone(),
        }
    }

    pub fn child(&self, name: &str) -> FileHandle {
        let path = if self.path.is_empty() {
            name.to_string()
        } else if self.path.ends_with('/') {
            format!("{}{}", self.path, name)
        } else {
            format!("{}/{}", self.path, name)
        };
        Self::new(&path, self.file_type, self.root.clone())
    }

    /// Handle for `name` in the same directory
    pub fn sibling(&self, name: &str) -> Result<FileHandle> {
        if self.path.is_empty() {
            return Err(Error::InvalidResource(
                "Cannot get the sibling of the root".to_string(),
            ));
        }
        Ok(self.parent().child(name))
    }

    pub fn exists(&self) -> bool {
        self.file_path().exists()
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let path = self.file_path();
        std::fs::read(&path).map_err(|e| {
            Error::Io(format!("{} ({:?}): {}", self.path, self.file_type, e))
        })
    }

    /// Read the whole file as UTF-8
    pub fn read_string(&self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            Error::Io(format!("{} is not valid UTF-8: {}", self.path, e))
        })
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

#[cfg(test)]
#[path = "file_handle_tests.rs"]
mod tests;
