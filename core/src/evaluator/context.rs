//! Name bindings for one evaluation call.

use std::sync::Arc;

use crate::{
    parser::CONTAINER,
    stdlib::Registry,
    values::{Constructor, Value, ViewCache},
};

/// Identifier bound to the acting player.
pub const PLAYER: &str = "player";

/// What an expression can name, plus the views created so far.
///
/// `container` and `player` are wrapped once on construction, so every read
/// of either yields the same view. Registry entries are wrapped on lookup
/// through the same cache. The context, and every view in it, is dropped
/// when the call ends.
#[derive(Debug)]
pub struct Context {
    container: Value,
    player: Value,
    registry: Arc<Registry>,
    cache: ViewCache,
}

impl Context {
    pub fn build(container: &Value, player: &Value, registry: Arc<Registry>) -> Self {
        let mut cache = ViewCache::new();
        let container = cache.wrap(container.clone());
        let player = cache.wrap(player.clone());
        Self {
            container,
            player,
            registry,
            cache,
        }
    }

    /// Resolve an identifier. `container` and `player` shadow globals.
    pub fn lookup(&mut self, name: &str) -> Option<Value> {
        match name {
            CONTAINER => Some(self.container.clone()),
            PLAYER => Some(self.player.clone()),
            _ => {
                let value = self.registry.get(name)?.clone();
                Some(self.cache.wrap(value))
            }
        }
    }

    /// Whether `name` is bound to something other than a registry global.
    pub fn is_local(&self, name: &str) -> bool {
        name == CONTAINER || name == PLAYER
    }

    /// A registry global, unless shadowed by a local.
    pub fn global(&self, name: &str) -> Option<&Value> {
        if self.is_local(name) {
            return None;
        }
        self.registry.get(name)
    }

    pub fn constructor(&self, name: &str) -> Option<&'static Constructor> {
        self.registry.constructor(name)
    }

    /// The wrapped container.
    pub fn container(&self) -> &Value {
        &self.container
    }

    pub fn player(&self) -> &Value {
        &self.player
    }

    pub fn cache_mut(&mut self) -> &mut ViewCache {
        &mut self.cache
    }
}
