/// UTF-8 text loader
///
/// The file is read on a worker thread; the foreground phase only unwraps
/// the string. Produces an `Arc<String>`.

use std::sync::Arc;
use crate::assets::{
    AssetLoaderBase, AssetLoaderParameters, AssetManager, AssetObject,
    AsynchronousAssetLoader, BackgroundData, LoadedDependencies,
};
use crate::error::{Error, Result};
use crate::files::{FileHandle, FileHandleResolver};

/// Options read from [`AssetLoaderParameters::options`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Convert `\r\n` line endings to `\n`
    pub normalize_line_endings: bool,
}

pub struct TextLoader {
    resolver: Arc<dyn FileHandleResolver>,
}

impl TextLoader {
    pub fn new(resolver: Arc<dyn FileHandleResolver>) -> Self {
        Self { resolver }
    }
}

impl AssetLoaderBase for TextLoader {
    fn resolver(&self) -> &Arc<dyn FileHandleResolver> {
        &self.resolver
    }
}

impl AsynchronousAssetLoader for TextLoader {
    fn load_async(
        &self,
        _dependencies: &LoadedDependencies,
        _file_name: &str,
        file: &FileHandle,
        params: Option<&AssetLoaderParameters>,
    ) -> Result<BackgroundData> {
        let mut text = file.read_string()?;

        let normalize = params
            .and_then(|p| p.options::<TextOptions>())
            .map_or(false, |options| options.normalize_line_endings);
        if normalize {
            text = text.replace("\r\n", "\n");
        }

        Ok(Box::new(text))
    }

    fn load_sync(
        &self,
        _manager: &AssetManager,
        file_name: &str,
        _file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
        data: BackgroundData,
    ) -> Result<AssetObject> {
        let text = data.downcast::<String>().map_err(|_| {
            Error::BackendError(format!("Unexpected background data for text asset {}", file_name))
        })?;
        Ok(Arc::new(*text))
    }
}
