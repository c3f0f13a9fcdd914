pub mod assets;
pub mod builder;
pub mod compose;
pub mod config;
pub mod helpers;
pub mod interp;
pub mod markdown;
pub mod pages;
pub mod steam;
pub mod vars;

// Re-export main types
pub use builder::{BuildError, SiteBuilder};
pub use compose::{ComposeError, Composer};
pub use config::{Engine, SiteConfig, SitePaths};
pub use pages::{Page, PageScanner, ScanError};
pub use steam::SteamClient;
pub use vars::{Value, VarStore};
