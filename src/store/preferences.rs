use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::utils::store_path;
use super::Storable;
use crate::config::PREFERENCES_STORE_FILE;
use crate::impl_store;

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// `System` follows the terminal, which is assumed light.
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggled(self) -> Self {
        if self.is_dark() {
            Self::Light
        } else {
            Self::Dark
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        };

        write!(f, "{name}")
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

impl Storable for Preferences {
    fn path() -> Result<PathBuf> {
        store_path(PREFERENCES_STORE_FILE)
    }
}

impl_store!(Preferences);

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn test_theme_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFERENCES_STORE_FILE);

        let prefs = Preferences::load_from(&path).await.unwrap();
        assert_eq!(prefs.theme, Theme::System);

        let mut prefs = prefs;
        prefs.theme = prefs.theme.toggled();
        prefs.save_to(&path).await.unwrap();

        let reloaded = Preferences::load_from(&path).await.unwrap();
        assert_eq!(reloaded.theme, Theme::Dark);

        let mut prefs = reloaded;
        prefs.theme = prefs.theme.toggled();
        prefs.save_to(&path).await.unwrap();

        assert_eq!(
            Preferences::load_from(&path).await.unwrap().theme,
            Theme::Light
        );
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::System.toggled(), Theme::Dark);
    }
}
