use crate::scene::config::SceneConfig;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Shared, lock-free holder of the current [`SceneConfig`].
///
/// Writers (a UI, the CLI, a config generator) replace the whole snapshot; the render loop calls
/// [`SceneCell::load`] once per tick so a frame never observes a half-applied edit.
#[derive(Debug)]
pub struct SceneCell {
    inner: ArcSwap<SceneConfig>,
}

impl SceneCell {
    /// Create a cell holding `config`.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<SceneConfig> {
        self.inner.load_full()
    }

    /// Replace the snapshot.
    pub fn store(&self, config: SceneConfig) {
        self.inner.store(Arc::new(config));
    }

    /// Apply an edit to a copy of the current snapshot and publish it.
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&mut SceneConfig),
    {
        self.inner.rcu(|cur| {
            let mut next = SceneConfig::clone(cur);
            f(&mut next);
            next
        });
    }
}

impl Default for SceneCell {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/cell.rs"]
mod tests;
