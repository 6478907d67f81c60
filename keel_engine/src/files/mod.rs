//! File handles and resolvers
//!
//! Maps logical asset names to storage locations. Resolution is pure:
//! nothing touches the file system until a handle is read.

mod file_handle;
mod resolvers;

pub use file_handle::{FileHandle, FileType};
pub use resolvers::{
    FileHandleResolver,
    InternalFileHandleResolver, ExternalFileHandleResolver,
    AbsoluteFileHandleResolver, ClasspathFileHandleResolver,
    PrefixFileHandleResolver,
};
