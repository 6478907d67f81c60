/*!
# Keel Engine

Asset pipeline and off-screen render targets for the Keel game framework.

The crate loads assets asynchronously with reference counting and dependency
tracking, and builds GL framebuffers from validated attachment descriptions.

## Architecture

- **AssetManager**: load queue, reference counts, dependency graph, progress
- **AssetLoadingTask**: per-request state machine (dependencies, async part, sync part)
- **AssetLoader**: synchronous or asynchronous loader, picked by type and file suffix
- **AsyncExecutor**: fixed pool of named worker threads
- **FileHandleResolver**: maps logical names to file handles
- **FrameBufferBuilder**: attachment description validated against the context
- **FrameBufferRegistry**: owns framebuffers and rebuilds them after a context loss

Everything except the executor's workers runs on the thread driving `update()`.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod files;
pub mod async_exec;
pub mod assets;
pub mod graphics;

// Main keel namespace module
pub mod keel {
    // Error types
    pub use crate::error::{Error, FrameBufferStatus, Result};

    // Engine facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    pub mod files {
        pub use crate::files::*;
    }

    pub mod async_exec {
        pub use crate::async_exec::*;
    }

    pub mod assets {
        pub use crate::assets::*;
    }

    pub mod graphics {
        pub use crate::graphics::*;
    }
}
