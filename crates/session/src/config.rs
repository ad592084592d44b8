use std::path::PathBuf;

use encore_core::routing::RouteTargets;

/// Default location of the persisted session context.
pub const DEFAULT_CONTEXT_STORE_PATH: &str = ".encore/context.json";

/// Session configuration loaded from environment variables.
///
/// All fields have defaults matching the stock page layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Page names for home, onboarding and the studio picker.
    pub targets: RouteTargets,
    /// File backing the [`FileContextStore`](crate::FileContextStore).
    pub context_store_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            targets: RouteTargets::default(),
            context_store_path: PathBuf::from(DEFAULT_CONTEXT_STORE_PATH),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `HOME_PAGE`          | `index.html`            |
    /// | `ONBOARDING_PAGE`    | `settings.html`         |
    /// | `STUDIO_PICKER_PAGE` | `select-studio.html`    |
    /// | `CONTEXT_STORE_PATH` | `.encore/context.json`  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit lookup. Blank
    /// values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            targets: RouteTargets {
                home: var("HOME_PAGE").unwrap_or(defaults.targets.home),
                onboarding: var("ONBOARDING_PAGE").unwrap_or(defaults.targets.onboarding),
                studio_picker: var("STUDIO_PICKER_PAGE")
                    .unwrap_or(defaults.targets.studio_picker),
            },
            context_store_path: var("CONTEXT_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.context_store_path),
        }
    }
}
