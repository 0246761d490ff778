use std::path::PathBuf;

use clap::Parser;

/// Serves the markdown course catalog over HTTP.
#[derive(Debug, Parser)]
#[command(name = "lms-server", version)]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(long, env = "LMS_PORT", default_value_t = 7000)]
    pub port: u16,

    /// Directory holding the course content tree.
    #[arg(long, env = "LMS_CONTENT_DIR", default_value = "public/content")]
    pub content_dir: PathBuf,

    /// SQLite database URL or file path.
    #[arg(long = "db", env = "LMS_DB_URL", default_value = "sqlite://db/catalog.sqlite3")]
    pub db_url: String,

    /// Only course directories starting with this prefix are scanned.
    #[arg(long, env = "LMS_COURSE_PREFIX", default_value = "teach-laoz")]
    pub course_prefix: String,
}
