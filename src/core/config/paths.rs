use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem locations used by the service.
///
/// Everything lives under a single data root so a deployment can be moved by
/// copying one directory. The documents directory is separate: it holds the
/// source corpus and is treated as read-only input.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub index_db_path: PathBuf,
    pub docs_dir: PathBuf,
    pub config_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = env::var("REFDESK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("refdesk-data"));
        let docs_dir = env::var("REFDESK_DOCS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("docs"));
        let config_path = env::var("REFDESK_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("refdesk.toml"));

        Self::assemble(data_dir, docs_dir, config_path)
    }

    /// Build a path set under a single root directory. Used by tests and by
    /// deployments that keep corpus and data side by side.
    pub fn rooted(root: &Path) -> Self {
        Self::assemble(
            root.join("data"),
            root.join("docs"),
            root.join("refdesk.toml"),
        )
    }

    fn assemble(data_dir: PathBuf, docs_dir: PathBuf, config_path: PathBuf) -> Self {
        let log_dir = data_dir.join("logs");
        let index_db_path = data_dir.join("index.db");

        for dir in [&data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            log_dir,
            index_db_path,
            docs_dir,
            config_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
