use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::Router;
use tower_http::services::ServeDir;

/// Configuration for the static site server
#[derive(Debug, Clone)]
pub struct StaticServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Root directory to serve
    pub root: PathBuf,
}

impl Default for StaticServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            root: PathBuf::from("build"),
        }
    }
}

/// A static file server for previewing a built site
pub struct StaticServer {
    config: StaticServerConfig,
}

impl StaticServer {
    /// Create a new server with the given configuration
    pub fn new(config: StaticServerConfig) -> Self {
        Self { config }
    }

    /// Run the server, blocking the calling thread until it exits
    pub fn run(&self) -> Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.serve())
    }

    async fn serve(&self) -> Result<()> {
        if !self.config.root.is_dir() {
            return Err(anyhow::anyhow!(
                "Output directory does not exist: {}. Run the build first.",
                self.config.root.display()
            ));
        }

        let app = Router::new().fallback_service(ServeDir::new(&self.config.root));

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        log::info!("Serving {} at http://{}", self.config.root.display(), addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
