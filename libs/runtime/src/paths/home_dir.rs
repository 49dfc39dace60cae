use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the application home directory.
///
/// - `None` (or empty) => `<platform base>/<default_subdir>`
/// - `~` or `~/...` => expanded against the platform base
/// - relative paths are taken relative to the current working directory
///
/// Platform base is `%APPDATA%` on Windows and `$HOME` elsewhere.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let base = platform_base()?;
    resolve_with_base(configured, default_subdir, create, &base)
}

fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    const VAR: &str = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    const VAR: &str = "HOME";

    std::env::var_os(VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("environment variable {VAR} is not set"))
}

pub(crate) fn resolve_with_base(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
    base: &Path,
) -> Result<PathBuf> {
    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => base.join(default_subdir),
        Some("~") => base.to_path_buf(),
        Some(p) if p.starts_with("~/") || p.starts_with("~\\") => base.join(&p[2..]),
        Some(p) => {
            let p = PathBuf::from(p);
            if p.is_absolute() {
                p
            } else {
                std::env::current_dir()
                    .context("cannot read current directory")?
                    .join(p)
            }
        }
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home dir {}", resolved.display()))?;
    }

    Ok(resolved)
}
