use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::STORE_DIR;

pub fn home_path(to_join: &str) -> Result<PathBuf> {
    let path = dirs::home_dir()
        .context("Could not find `home` directory")?
        .join(to_join);

    log::debug!("Home path + joined: {:?}", path);

    Ok(path)
}

pub fn store_path(file: &str) -> Result<PathBuf> {
    home_path(STORE_DIR).map(|dir| dir.join(file))
}
