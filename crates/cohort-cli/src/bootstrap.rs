use std::path::{Path, PathBuf};

use anyhow::Context;
use cohort_config::{CohortsConfig, PROJECT_DIR};

/// Project root from `--project`, or the current directory.
///
/// `--project` may name the root itself or its `.cohorts` directory.
pub fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    let Some(path) = project_override else {
        return std::env::current_dir().context("failed to read current directory");
    };

    let explicit = PathBuf::from(path);
    if explicit
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == PROJECT_DIR)
    {
        return explicit
            .parent()
            .map(Path::to_path_buf)
            .context("invalid --project path: '.cohorts' directory has no parent");
    }

    if explicit.is_dir() {
        return Ok(explicit);
    }

    anyhow::bail!(
        "invalid --project '{}': directory does not exist",
        explicit.display()
    );
}

/// Load `<root>/.env` (falling back to the usual dotenv search), then the
/// layered configuration for `root`.
pub fn load_config(project_root: &Path) -> anyhow::Result<CohortsConfig> {
    load_project_dotenv(project_root)?;
    CohortsConfig::load_from(project_root).context("failed to load cohorts configuration")
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}
