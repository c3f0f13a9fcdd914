use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tera::Tera;

use crate::config::{Engine, SitePaths};
use crate::helpers;
use crate::interp;
use crate::markdown::{self, ConvertError};
use crate::pages::Page;
use crate::steam::SteamClient;
use crate::vars::{Value, VarStore};

pub const BASE_LAYOUT: &str = "base_page.html";
const REQUIRED_LAYOUTS: [&str; 4] = ["base_page.html", "header.html", "footer.html", "topnav.html"];

#[derive(Debug)]
pub enum ComposeError {
    Io { path: PathBuf, source: std::io::Error },
    MissingLayout(PathBuf),
    Template(tera::Error),
    Convert(ConvertError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ComposeError::MissingLayout(path) => {
                write!(f, "missing required layout file: {}", path.display())
            }
            ComposeError::Template(err) => write!(f, "template error: {}", err),
            ComposeError::Convert(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ComposeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ComposeError::Io { source, .. } => Some(source),
            ComposeError::MissingLayout(_) => None,
            ComposeError::Template(err) => Some(err),
            ComposeError::Convert(err) => Some(err),
        }
    }
}

impl From<tera::Error> for ComposeError {
    fn from(err: tera::Error) -> Self {
        ComposeError::Template(err)
    }
}

impl From<ConvertError> for ComposeError {
    fn from(err: ConvertError) -> Self {
        ComposeError::Convert(err)
    }
}

// Engine-specific compose state. The tera engine keeps two instances so
// helper scoping differs between the content pass and the layout pass;
// the scan engine only needs the raw base layout source, components are
// pre-substituted into the working store.
enum EngineState {
    Tera { layout: Tera, content: Tera },
    Scan { base: String },
}

/// Renders pages against the layout set. Layouts are loaded and parsed
/// once at construction; `compose` runs the fixed per-page sequence:
/// convert, fragment interpolation, page-local store, base layout.
pub struct Composer {
    store: VarStore,
    state: EngineState,
}

impl Composer {
    pub fn new(
        paths: &SitePaths,
        engine: Engine,
        store: VarStore,
        steam: &SteamClient,
    ) -> Result<Self, ComposeError> {
        let layouts = load_layouts(&paths.layout)?;

        match engine {
            Engine::Tera => {
                // Text values are escaped once when the context is built,
                // so autoescape stays off in both instances.
                let mut layout = Tera::default();
                layout.add_raw_templates(layouts.clone())?;
                layout.autoescape_on(vec![]);
                helpers::register_layout(&mut layout, &paths.assets, steam);

                let mut content = Tera::default();
                content.add_raw_templates(layouts)?;
                content.autoescape_on(vec![]);
                helpers::register_content(&mut content, steam);

                Ok(Self {
                    store,
                    state: EngineState::Tera { layout, content },
                })
            }
            Engine::Scan => {
                // One component pass per build: each non-base layout is
                // substituted and folded into the working store under its
                // file stem. Folding is cumulative, nav first, so header
                // and footer can splice the nav and extras can splice any
                // of the three.
                let mut working = store;
                let mut base = String::new();
                let mut remaining = layouts;
                for name in ["topnav.html", "header.html", "footer.html"] {
                    if let Some(pos) = remaining.iter().position(|(n, _)| n == name) {
                        let (name, source) = remaining.remove(pos);
                        fold_component(&mut working, &name, &source);
                    }
                }
                for (name, source) in remaining {
                    if name == BASE_LAYOUT {
                        base = source;
                        continue;
                    }
                    fold_component(&mut working, &name, &source);
                }

                Ok(Self {
                    store: working,
                    state: EngineState::Scan { base },
                })
            }
        }
    }

    /// Compose one page into a full document. The shared store is never
    /// touched; `main_content` and `title` only exist in the page-local
    /// copy built here.
    pub fn compose(&mut self, page: &Page) -> Result<String, ComposeError> {
        let fragment = markdown::to_html(&page.content)?;

        let interpolated = match &mut self.state {
            EngineState::Tera { content, .. } => {
                content.render_str(&fragment, &self.store.to_context())?
            }
            EngineState::Scan { .. } => interp::scan_substitute(&fragment, &self.store),
        };

        let mut local = self.store.clone();
        local.insert("main_content", Value::html(interpolated));
        if !local.contains("title") {
            local.insert("title", Value::text(page.title.clone()));
        }

        match &self.state {
            EngineState::Tera { layout, .. } => {
                Ok(layout.render(BASE_LAYOUT, &local.to_context())?)
            }
            EngineState::Scan { base } => Ok(interp::scan_substitute(base, &local)),
        }
    }
}

fn fold_component(working: &mut VarStore, name: &str, source: &str) {
    let stem = name.strip_suffix(".html").unwrap_or(name).to_string();
    let rendered = interp::scan_substitute(source, working);
    working.insert(stem, Value::html(rendered));
}

// The four fixed layouts, then any other template in the directory as an
// extra component, in name order.
fn load_layouts(dir: &Path) -> Result<Vec<(String, String)>, ComposeError> {
    let mut layouts = Vec::new();
    for name in REQUIRED_LAYOUTS {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(ComposeError::MissingLayout(path));
        }
        layouts.push((name.to_string(), read_layout(&path)?));
    }

    let entries = fs::read_dir(dir).map_err(|source| ComposeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut extras = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ComposeError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().map(|ext| ext != "html").unwrap_or(true) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !REQUIRED_LAYOUTS.contains(&name.as_str()) {
            extras.push((name, read_layout(&path)?));
        }
    }
    extras.sort();
    layouts.extend(extras);

    Ok(layouts)
}

fn read_layout(path: &Path) -> Result<String, ComposeError> {
    fs::read_to_string(path).map_err(|source| ComposeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
