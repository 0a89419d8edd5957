use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Leading-dot suffixes opened in the editor; anything else goes to the OS.
    /// An empty list opens every file in the editor.
    pub extensions: Vec<String>,
    /// Title fetch timeout in milliseconds
    pub timeout: u64,
    /// Overrides the OS default opener for web links
    pub browser_cmd: Option<String>,
    /// Root for `{filename}/...` pelican paths; relative to the document when unset
    pub pelican_content_dir: Option<String>,
    pub log_level: String,
    pub security: SecurityPolicy,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SecurityPolicy {
    pub block_local_networks: bool,
    pub allowed_schemes: Vec<String>,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/linkfollow/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.linkfollow",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("extensions", vec![".md", ".markdown", ".txt"])?
            .set_default("timeout", 5000)?
            .set_default("log_level", "info")?
            .set_default("security.block_local_networks", true)?
            .set_default("security.allowed_schemes", vec!["http", "https"])?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// Whether a file path should be opened in the editor rather than handed
    /// to the OS.
    pub fn opens_in_editor(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };

        self.extensions.iter().any(|configured| {
            configured
                .strip_prefix('.')
                .unwrap_or(configured)
                .eq_ignore_ascii_case(extension)
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            extensions: vec![".md".to_string(), ".markdown".to_string(), ".txt".to_string()],
            timeout: 5000,
            browser_cmd: None,
            pelican_content_dir: None,
            log_level: "info".to_string(),
            security: SecurityPolicy::default(),
        }
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        SecurityPolicy {
            block_local_networks: true,
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
        }
    }
}
