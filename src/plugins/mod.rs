//! Code plugins: named capability implementations resolved at startup.
//!
//! A plugin declares which phases it handles through [Capabilities]. Load
//! and callback failures are logged and never abort a release.

pub mod builtin;

use crate::config::PluginRef;
use crate::context::ReleaseContext;
use crate::hooks::Phase;
use crate::ui::formatter;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub use builtin::{ReleaseSummaryPlugin, VersionFilePlugin};

/// Which lifecycle phases a plugin implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub pre_checks: bool,
    pub pre_workflow: bool,
    pub post_push: bool,
    pub post_bump: bool,
    /// Asynchronous, see [Plugin::after_release]
    pub post_release: bool,
}

impl Capabilities {
    pub fn only(phases: &[Phase]) -> Self {
        let mut caps = Capabilities::default();
        for phase in phases {
            match phase {
                Phase::PreChecks => caps.pre_checks = true,
                Phase::PreWorkflow => caps.pre_workflow = true,
                Phase::PostPush => caps.post_push = true,
                Phase::PostBump => caps.post_bump = true,
                Phase::PostRelease => caps.post_release = true,
            }
        }
        caps
    }

    pub fn handles(&self, phase: Phase) -> bool {
        match phase {
            Phase::PreChecks => self.pre_checks,
            Phase::PreWorkflow => self.pre_workflow,
            Phase::PostPush => self.post_push,
            Phase::PostBump => self.post_bump,
            Phase::PostRelease => self.post_release,
        }
    }
}

/// A lifecycle observer/extender
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Synchronous callback for every handled phase except post-release
    fn on_phase(&self, _phase: Phase, _context: &ReleaseContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Post-release callback; awaited before the next plugin runs
    async fn after_release(&self, _context: &ReleaseContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Builds a plugin from its configured options
pub type PluginFactory = fn(&toml::Table) -> anyhow::Result<Box<dyn Plugin>>;

/// Named plugin factories
#[derive(Clone, Default)]
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Registry with `version-file` and `release-summary`
    pub fn with_builtins() -> Self {
        let mut registry = PluginRegistry::new();
        registry.register(builtin::VERSION_FILE, VersionFilePlugin::from_options);
        registry.register(builtin::RELEASE_SUMMARY, ReleaseSummaryPlugin::from_options);
        registry
    }

    pub fn register(&mut self, name: &str, factory: PluginFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiate configured plugins in order; failures are skipped with a warning
    pub fn load(&self, refs: &[PluginRef]) -> Plugins {
        let mut plugins = Plugins::default();
        for plugin_ref in refs {
            let name = plugin_ref.name();
            let Some(factory) = self.factories.get(name) else {
                report(name, "load", &format!("unknown plugin (known: {})", self.names().join(", ")));
                continue;
            };
            match factory(&plugin_ref.options()) {
                Ok(plugin) => {
                    debug!(plugin = name, caps = ?plugin.capabilities(), "plugin loaded");
                    plugins.plugins.push(plugin);
                }
                Err(e) => report(name, "load", &e.to_string()),
            }
        }
        plugins
    }
}

fn report(plugin: &str, what: &str, message: &str) {
    warn!(plugin, "plugin {} failed: {}", what, message);
    formatter::display_warning(&format!("Plugin `{}` {} failed: {}", plugin, what, message));
}

/// Loaded plugins in registration order
#[derive(Default)]
pub struct Plugins {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Plugins {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Plugins { plugins }
    }

    pub fn push(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run synchronous callbacks of a phase; returns how many failed
    pub fn run_phase(&self, phase: Phase, context: &ReleaseContext) -> usize {
        if phase.is_async() {
            return 0;
        }
        let mut failures = 0;
        for plugin in self.plugins.iter().filter(|p| p.capabilities().handles(phase)) {
            if let Err(e) = plugin.on_phase(phase, context) {
                report(plugin.name(), phase.name(), &format!("{:#}", e));
                failures += 1;
            }
        }
        failures
    }

    /// Await every post-release callback, one at a time; returns how many failed
    pub async fn run_post_release(&self, context: &ReleaseContext) -> usize {
        let mut failures = 0;
        for plugin in self
            .plugins
            .iter()
            .filter(|p| p.capabilities().handles(Phase::PostRelease))
        {
            if let Err(e) = plugin.after_release(context).await {
                report(plugin.name(), Phase::PostRelease.name(), &format!("{:#}", e));
                failures += 1;
            }
        }
        failures
    }
}
