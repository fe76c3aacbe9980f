//! Host resource loading seam.
//!
//! Widgets pull local file content (markup, images, media) through a
//! [`ResourceLoader`] so the host can route the lookup through whatever
//! resource system it has. [`FsResourceLoader`] is the plain-filesystem
//! implementation, with resource groups mapping to subdirectories.

use crate::errors::CanvasError;
use std::path::PathBuf;

pub trait ResourceLoader {
    /// Loads `filename` from the named resource group. An empty group name
    /// addresses the default location.
    fn load(&self, filename: &str, group: &str) -> Result<Vec<u8>, CanvasError>;
}

pub struct FsResourceLoader {
    root: PathBuf,
}

impl FsResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, filename: &str, group: &str) -> Result<Vec<u8>, CanvasError> {
        let mut path = self.root.clone();
        if !group.is_empty() {
            path.push(group);
        }
        path.push(filename);

        Ok(std::fs::read(path)?)
    }
}
