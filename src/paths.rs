//! XDG-compliant path resolution for ski-loop.
//!
//! The engine needs two locations: the knowledge store file and the TOML config.
//! Both follow the XDG Base Directory Specification with `$HOME` fallbacks.
//! Neither directory is created here; the store and config writers create
//! their parent directories on first write.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

const APP_DIR: &str = "ski-loop";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(ski::paths::no_home),
        help(
            "Set the HOME environment variable, pass `--store` and `--config` \
             explicitly, or run with `--ephemeral`."
        )
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Default on-disk locations for ski-loop.
#[derive(Debug, Clone)]
pub struct SkiPaths {
    /// `$XDG_CONFIG_HOME/ski-loop/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/ski-loop/`
    pub data_dir: PathBuf,
}

/// `$var` if set, else `$HOME/<fallback>`.
fn xdg_root(var: &str, home: &Path, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(fallback))
}

impl SkiPaths {
    /// Resolve from `XDG_CONFIG_HOME` / `XDG_DATA_HOME`, falling back to
    /// `~/.config` and `~/.local/share`.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(PathError::NoHome)?;
        Ok(Self::under(
            &xdg_root("XDG_CONFIG_HOME", &home, ".config"),
            &xdg_root("XDG_DATA_HOME", &home, ".local/share"),
        ))
    }

    /// Paths under explicit config and data roots.
    pub fn under(config_root: &Path, data_root: &Path) -> Self {
        Self {
            config_dir: config_root.join(APP_DIR),
            data_dir: data_root.join(APP_DIR),
        }
    }

    /// Path to the redb knowledge store.
    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join("knowledge.redb")
    }

    /// Path to the engine config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_derive_from_roots() {
        let paths = SkiPaths::under(Path::new("/cfg"), Path::new("/data"));
        assert_eq!(paths.config_dir, PathBuf::from("/cfg/ski-loop"));
        assert_eq!(
            paths.store_file(),
            PathBuf::from("/data/ski-loop/knowledge.redb")
        );
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/cfg/ski-loop/config.toml")
        );
    }

    #[test]
    fn unset_xdg_var_falls_back_to_home() {
        let root = xdg_root("SKI_LOOP_TEST_UNSET_XDG_VAR", Path::new("/home/u"), ".config");
        assert_eq!(root, PathBuf::from("/home/u/.config"));
    }
}
