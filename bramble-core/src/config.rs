use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fmt, fs};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(serde_yaml::Error),
    Icon { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "YAML parse error: {}", e),
            ConfigError::Icon { path, source } => {
                write!(f, "failed to read icon {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

/// The directory roots one build runs against. Built once from CLI flags
/// and handed to every component; nothing looks paths up on its own.
#[derive(Debug, Clone)]
pub struct SitePaths {
    /// Content root: `pages/`, `icons/`, and the static subtrees live here.
    pub assets: PathBuf,
    /// Directory holding `base_page.html` and its named components.
    pub layout: PathBuf,
    /// The site config file.
    pub config: PathBuf,
    /// Build output root.
    pub build: PathBuf,
}

impl SitePaths {
    pub fn new<P: AsRef<Path>>(assets: P, layout: P, config: P, build: P) -> Self {
        Self {
            assets: assets.as_ref().to_path_buf(),
            layout: layout.as_ref().to_path_buf(),
            config: config.as_ref().to_path_buf(),
            build: build.as_ref().to_path_buf(),
        }
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.assets.join("pages")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.assets.join("icons")
    }
}

/// Which interpolation engine composes the site.
///
/// `Tera` is the full template language: conditionals, loops, helper
/// function calls, and strict parse errors. `Scan` is the older
/// delimiter-scan pass: `{{ name }}` lookups only, malformed tokens left
/// in place. Both run against the same variable store.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Tera,
    Scan,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub template: TemplateSection,
    pub env: EnvSection,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct TemplateSection {
    pub params: BTreeMap<String, String>,
    /// Icon name to file name under `<assets>/icons/`; each is inlined
    /// into the store as `<name>Icon`.
    pub icons: BTreeMap<String, String>,
    pub styles: StylesSection,
    pub engine: Engine,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct StylesSection {
    #[serde(rename = "sheetURL")]
    pub sheet_url: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct EnvSection {
    pub params: BTreeMap<String, String>,
}

impl SiteConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_yaml::from_str(data)?;
        Ok(config)
    }
}
