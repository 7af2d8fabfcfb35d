//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "agentic-chat";
const PROJECT_FILES: [&str; 2] = ["agentic-chat.toml", ".agentic-chat.toml"];
const ENV_PREFIX: &str = "AGENTIC_CHAT_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AGENTIC_CHAT_*` environment variables (`AGENTIC_CHAT_PROVIDER__BASE_URL`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./agentic-chat.toml` or `./.agentic-chat.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/agentic-chat/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::files(config_path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Defaults plus every config file, without the environment layer
    fn files(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/agentic-chat/config.toml`, or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for `--show-config`)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {}*", ENV_PREFIX));

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            lines.push(format!("  [{}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.session.autosave_ms, 1000);
        assert_eq!(config.provider.api_key_env, "OPENROUTER_API_KEY");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[provider]
timeout_seconds = 5

[output]
color = false
"#,
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::files(Some(&path)).extract().unwrap();
        assert_eq!(config.provider.timeout_seconds, 5);
        assert!(!config.output.color);
        // untouched sections keep their defaults
        assert_eq!(config.session.autosave_ms, 1000);
        assert_eq!(config.models.active.len(), 4);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[provider]\ntimeout_seconds = \"soon\"\n").unwrap();
        assert!(ConfigLoader::files(Some(&path)).extract::<FileConfig>().is_err());
    }

    #[test]
    fn test_global_config_path_is_app_specific() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("agentic-chat"));
    }

    #[test]
    fn test_describe_sources_lists_explicit_file() {
        let lines = ConfigLoader::describe_sources(Some(Path::new("/no/such/file.toml")));
        assert!(lines.iter().any(|l| l.contains("[MISS ] Explicit: /no/such/file.toml")));
        assert!(lines.last().unwrap().contains("Default"));
    }
}
