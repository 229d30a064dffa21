use serde::Deserialize;

/// Configuration options of the catalog server.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Interface the HTTP server binds to.
    pub address: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Flat file (CSV or JSON) loaded into the table at startup.
    pub data_file: String,
    /// Directory where rendered charts are also saved, if set.
    #[serde(default)]
    pub visualization_dir: Option<String>,
}
