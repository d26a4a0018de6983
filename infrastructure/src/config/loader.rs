//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILENAMES: [&str; 2] = ["toolguard.toml", ".toolguard.toml"];
const ENV_PREFIX: &str = "TOOLGUARD_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TOOLGUARD_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./toolguard.toml` or `./.toolguard.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/toolguard/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged provider stack, before extraction.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns `XDG_CONFIG_HOME/toolguard/config.toml` if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolguard").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILENAMES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        let env_vars: Vec<String> = std::env::vars()
            .map(|(k, _)| k)
            .filter(|k| k.starts_with(ENV_PREFIX))
            .collect();
        if env_vars.is_empty() {
            println!("  [     ] Env:      {ENV_PREFIX}*");
        } else {
            println!("  [FOUND] Env:      {}", env_vars.join(", "));
        }

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{mark:<5}] Explicit: {}", path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project:  {}", path.display());
        } else {
            println!("  [     ] Project:  ./toolguard.toml or ./.toolguard.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:   {}", path.display());
            } else {
                println!("  [     ] Global:   {}", path.display());
            }
        }

        println!("  [     ] Default:  built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(!config.adjudicator.enabled);
        assert_eq!(config.loop_detection.consecutive_threshold, 3);
        assert!(config.tools.custom.is_empty());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("toolguard"));
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "toolguard.toml",
                r#"
[loop_detection]
consecutive_threshold = 6

[logging]
debug = true
"#,
            )?;

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.loop_detection.consecutive_threshold, 6);
            assert_eq!(config.loop_detection.window_messages, 40);
            assert!(config.logging.debug);
            Ok(())
        });
    }

    #[test]
    fn test_hidden_project_file_is_found() {
        Jail::expect_with(|jail| {
            jail.create_file(".toolguard.toml", "[adjudicator]\nmodel = \"local\"\n")?;
            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.adjudicator.model, "local");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path_beats_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file("toolguard.toml", "[adjudicator]\ntimeout_ms = 1000\n")?;
            jail.create_file("custom.toml", "[adjudicator]\ntimeout_ms = 2000\n")?;

            let config = ConfigLoader::load(Some(Path::new("custom.toml"))).map_err(|e| *e)?;
            assert_eq!(config.adjudicator.timeout_ms, 2000);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_files() {
        Jail::expect_with(|jail| {
            jail.create_file("toolguard.toml", "[adjudicator]\nenabled = false\n")?;
            jail.set_env("TOOLGUARD_ADJUDICATOR__ENABLED", "true");
            jail.set_env("TOOLGUARD_PLAN_EXIT_GUARD__MIN_IMPLEMENTATION_CALLS", "7");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert!(config.adjudicator.enabled);
            assert_eq!(config.plan_exit_guard.min_implementation_calls, 7);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "toolguard.toml",
                "[loop_detection]\nwindow_messages = \"many\"\n",
            )?;
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
