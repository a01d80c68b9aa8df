use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::utils::store_path;
use super::Storable;
use crate::config::CONTEXT_STORE_FILE;
use crate::impl_store;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Context {
    pub default_user: Option<String>,
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl Storable for Context {
    fn path() -> Result<PathBuf> {
        store_path(CONTEXT_STORE_FILE)
    }
}

impl_store!(Context);
