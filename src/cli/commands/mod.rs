//! Command implementations

pub mod case;
pub mod check;
pub mod completions;
pub mod export;
pub mod import;
pub mod module;
pub mod product;
pub mod reset;
pub mod run;
pub mod suite;
pub mod summary;
pub mod version;

use std::path::Path;

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, EntityKind, LedgerError, Workspace};
use crate::storage::JsonFileStore;

/// A loaded workspace plus the store it came from
///
/// Mutating commands call [`Session::save`] once at the end.
pub struct Session {
    pub config: Config,
    pub workspace: Workspace,
    store: JsonFileStore,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = load_config(global)?;
        let mut store = JsonFileStore::open(config.store_path())?;
        let workspace = Workspace::load(&mut store)?;
        Ok(Self {
            config,
            workspace,
            store,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        self.workspace.save(&mut self.store)?;
        Ok(())
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }
}

/// User config with the `--store` override applied
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(path) = &global.store {
        config.store_path = Some(path.clone());
    }
    Ok(config)
}

pub(crate) fn not_found(kind: EntityKind, id: &str) -> miette::Report {
    LedgerError::not_found(kind, id).into()
}
