use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::utils::store_path;
use super::Storable;
use crate::config::AUTH_STORE_FILE;
use crate::impl_store;

/// Access tokens of every user that signed in on this machine, by user id.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Auth {
    pub authorized: HashMap<String, String>,
}

impl Storable for Auth {
    fn path() -> Result<PathBuf> {
        store_path(AUTH_STORE_FILE)
    }
}

impl_store!(Auth);
