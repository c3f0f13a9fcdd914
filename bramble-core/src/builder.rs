use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, info};

use crate::assets;
use crate::compose::{ComposeError, Composer};
use crate::config::{ConfigError, SiteConfig, SitePaths};
use crate::pages::{PageScanner, ScanError};
use crate::steam::SteamClient;
use crate::vars::VarStore;

#[derive(Debug)]
pub enum BuildError {
    Config(ConfigError),
    Scan(ScanError),
    Compose(ComposeError),
    Assets(io::Error),
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Config(err) => write!(f, "config error: {}", err),
            BuildError::Scan(err) => write!(f, "scan error: {}", err),
            BuildError::Compose(err) => write!(f, "compose error: {}", err),
            BuildError::Assets(err) => write!(f, "failed to copy static assets: {}", err),
            BuildError::Io { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Config(err) => Some(err),
            BuildError::Scan(err) => Some(err),
            BuildError::Compose(err) => Some(err),
            BuildError::Assets(err) => Some(err),
            BuildError::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        BuildError::Config(err)
    }
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        BuildError::Scan(err)
    }
}

impl From<ComposeError> for BuildError {
    fn from(err: ComposeError) -> Self {
        BuildError::Compose(err)
    }
}

/// One-shot site builder. Reads the config up front; `build` does the
/// rest: clean output root, static assets, variable store, page scan,
/// then compose-and-write per page in discovery order.
pub struct SiteBuilder {
    paths: SitePaths,
    config: SiteConfig,
}

impl SiteBuilder {
    pub fn new(paths: SitePaths) -> Result<Self, BuildError> {
        let config = SiteConfig::read(&paths.config)?;
        Ok(Self { paths, config })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run one full build. The first failing page aborts the run; pages
    /// already written stay on disk. Returns the number of pages written.
    pub fn build(&self) -> Result<usize, BuildError> {
        info!("building into {}", self.paths.build.display());

        if let Err(source) = fs::remove_dir_all(&self.paths.build) {
            if source.kind() != io::ErrorKind::NotFound {
                return Err(BuildError::Io {
                    path: self.paths.build.clone(),
                    source,
                });
            }
        }
        fs::create_dir_all(&self.paths.build).map_err(|source| BuildError::Io {
            path: self.paths.build.clone(),
            source,
        })?;

        assets::copy_static(&self.paths.assets, &self.paths.build).map_err(BuildError::Assets)?;

        let store = VarStore::assemble(&self.config, &self.paths)?;
        let pages = PageScanner::new(self.paths.pages_dir(), &self.paths.build).scan()?;

        let steam = SteamClient::from_env();
        let mut composer = Composer::new(
            &self.paths,
            self.config.template.engine,
            store,
            &steam,
        )?;

        for page in &pages {
            let html = composer.compose(page)?;
            if let Some(parent) = page.output_path.parent() {
                fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&page.output_path, html).map_err(|source| BuildError::Io {
                path: page.output_path.clone(),
                source,
            })?;
            debug!("wrote {}", page.output_path.display());
        }

        info!("built {} pages", pages.len());
        Ok(pages.len())
    }
}
