use std::path::PathBuf;

use anyhow::{Context, Result};
use homedir::my_home;

use crate::{app::context::AppContext, config::Config, vault::LocalVault};

const BASE_DIR_ENV: &str = "VQ_BASE_DIR";

/// Builds an [`AppContext`] from the config directory.
pub struct AppFactory;

impl AppFactory {
    /// `--base-dir`, then `VQ_BASE_DIR`, then `~/.local/share/vq`.
    pub fn get_base_path(base_dir: Option<&str>) -> Result<String> {
        if let Some(base_dir) = base_dir {
            return Ok(base_dir.to_string());
        }

        if let Ok(base_dir) = std::env::var(BASE_DIR_ENV) {
            if !base_dir.trim().is_empty() {
                return Ok(base_dir);
            }
        }

        let home = my_home()
            .context("could not determine home directory")?
            .context("home directory path is empty")?;
        Ok(format!("{}/.local/share/vq", home.to_string_lossy()))
    }

    pub fn create_config(base_path: &str) -> Result<Config> {
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("failed to create base directory {base_path}"))?;
        Config::load_with(base_path)
    }

    /// Load the config and scan the vault. `vault` overrides `vault.path`.
    pub fn create_context(base_path: &str, vault: Option<&str>) -> Result<AppContext> {
        let config = Self::create_config(base_path)?;

        let vault_path = PathBuf::from(vault.unwrap_or(&config.vault.path));
        let vault = LocalVault::open(&vault_path, &config.vault)
            .with_context(|| format!("failed to open vault {}", vault_path.display()))?;

        Ok(AppContext::new(config, vault))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_base_dir_wins() {
        let path = AppFactory::get_base_path(Some("/tmp/vq-test")).unwrap();
        assert_eq!(path, "/tmp/vq-test");
    }

    #[test]
    fn test_create_context_with_vault_override() {
        let base = tempfile::tempdir().unwrap();
        let vault = tempfile::tempdir().unwrap();
        std::fs::write(vault.path().join("a.md"), "# a").unwrap();

        let ctx = AppFactory::create_context(
            base.path().to_str().unwrap(),
            Some(vault.path().to_str().unwrap()),
        )
        .unwrap();

        assert_eq!(ctx.vault().records().len(), 1);
        assert!(base.path().join("config.yaml").exists());
    }

    #[test]
    fn test_missing_vault_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let missing = base.path().join("nope");
        let res = AppFactory::create_context(
            base.path().to_str().unwrap(),
            Some(missing.to_str().unwrap()),
        );
        assert!(res.is_err());
    }
}
