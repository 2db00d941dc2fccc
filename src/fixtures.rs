use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_FIXTURE_DIR: &str = "assets";

/// Static JSON files served verbatim by some routes.
#[derive(Debug, Clone)]
pub struct Fixtures {
    dir: PathBuf,
}

impl Fixtures {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read `name` from the fixture directory. Files are read on every call, so edits show up
    /// without a restart.
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        std::fs::read_to_string(&path).map_err(|source| Error::MissingFixture {
            name: path.display().to_string(),
            source,
        })
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_DIR)
    }
}
