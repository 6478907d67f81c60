/// Raw bytes loader (synchronous), produces an `Arc<Vec<u8>>`

use std::sync::Arc;
use crate::assets::{AssetLoaderBase, AssetLoaderParameters, AssetManager, AssetObject, SynchronousAssetLoader};
use crate::error::Result;
use crate::files::{FileHandle, FileHandleResolver};

pub struct BinaryLoader {
    resolver: Arc<dyn FileHandleResolver>,
}

impl BinaryLoader {
    pub fn new(resolver: Arc<dyn FileHandleResolver>) -> Self {
        Self { resolver }
    }
}

impl AssetLoaderBase for BinaryLoader {
    fn resolver(&self) -> &Arc<dyn FileHandleResolver> {
        &self.resolver
    }
}

impl SynchronousAssetLoader for BinaryLoader {
    fn load(
        &self,
        _manager: &AssetManager,
        _file_name: &str,
        file: &FileHandle,
        _params: Option<&AssetLoaderParameters>,
    ) -> Result<AssetObject> {
        Ok(Arc::new(file.read_bytes()?))
    }
}
