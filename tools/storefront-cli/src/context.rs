//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use storefront_commerce::cart::CartStore;
use storefront_commerce::checkout::{CheckoutOrchestrator, OrderHistory, SimulatedGateway};
use storefront_commerce::Session;
use storefront_kv::{Cache, FileStore, SessionStore};

use crate::backend::{ConfiguredWallet, LocalOrderService};
use crate::config::StorefrontConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: StorefrontConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Config file in use, if one was found.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (StorefrontConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (StorefrontConfig::load(&path)?, Some(path)),
                None => (StorefrontConfig::default(), None),
            },
        };

        if let Some(ref path) = config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
        })
    }

    /// Directory the data dir is resolved against.
    fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Where persisted state lives.
    pub fn data_dir(&self) -> PathBuf {
        let dir = PathBuf::from(&self.config.data_dir);
        if dir.is_absolute() {
            dir
        } else {
            self.base_dir().join(dir)
        }
    }

    /// Open the persisted key-value store.
    pub fn cache(&self) -> Result<Cache> {
        let dir = self.data_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
        Ok(Cache::new(Arc::new(store)))
    }

    /// Login sessions on this device.
    pub fn sessions(&self, cache: &Cache) -> SessionStore<Session> {
        SessionStore::new(cache.clone())
    }

    /// The signed-in session, or an error asking the user to log in.
    pub fn require_session(&self, cache: &Cache) -> Result<Session> {
        match self.sessions(cache).current()? {
            Some((_, session)) => Ok(session),
            None => anyhow::bail!("Not logged in. Run `storefront login <user-id>` first."),
        }
    }

    /// Cart of the signed-in user.
    pub fn cart(&self, cache: &Cache, session: &Session) -> CartStore {
        CartStore::new(cache.clone(), session)
    }

    /// Order history of the signed-in user.
    pub fn history(&self, cache: &Cache, session: &Session) -> OrderHistory {
        OrderHistory::new(cache.clone(), session)
    }

    /// Wire an orchestrator against the local backends.
    pub fn orchestrator(&self, cache: &Cache, session: Session) -> Result<CheckoutOrchestrator> {
        let pricing = self.config.pricing_config()?;
        let wallet = ConfiguredWallet::new(self.config.wallet_balance()?);
        let gateway = SimulatedGateway::from_mode(self.config.payment.gateway);

        Ok(CheckoutOrchestrator::new(
            session.clone(),
            pricing,
            self.cart(cache, &session),
            self.history(cache, &session),
            Arc::new(LocalOrderService::new(cache.clone())),
            Arc::new(wallet),
            Arc::new(gateway),
        )
        .with_options(self.config.checkout_options()))
    }

    /// Path `config init` writes to.
    pub fn default_config_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_NAMES[0])
    }
}

/// Find config file in directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("storefront.toml"), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(dir.path().join("storefront.toml")));
    }

    #[test]
    fn test_data_dir_is_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            config: StorefrontConfig::default(),
            output: Output::new(false, true),
            cwd: PathBuf::from("/elsewhere"),
            config_path: Some(dir.path().join("storefront.toml")),
        };
        assert_eq!(ctx.data_dir(), dir.path().join(".storefront"));
    }

    #[test]
    fn test_require_session_without_login() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            config: StorefrontConfig::default(),
            output: Output::new(false, true),
            cwd: dir.path().to_path_buf(),
            config_path: None,
        };
        let cache = ctx.cache().unwrap();
        let err = ctx.require_session(&cache).unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }
}
