//! Remote facade over a region or match
//!
//! `Remote<T>` forwards every search and action to the wrapped object and
//! passes what comes back through the registry: matches and regions leave as
//! handles, numbers and flags as plain values, errors as `RemoteFault`s.
//! Actions answer with the handle of the wrapped object itself so the remote
//! side can keep chaining on it.

use super::value::{Proxify, RemoteResult, RemoteValue};
use super::{Handle, ProxyRegistry, RemoteObject};
use crate::desktop::{Key, MouseButton};
use crate::error::GuiResult;
use crate::matches::Match;
use crate::pattern::Image;
use crate::region::{Region, Target};
use std::sync::Arc;
use std::time::Duration;

/// Anything exposing the region API
pub trait RegionLike: Send + Sync + 'static {
    fn region(&self) -> &Region;
    fn to_object(this: &Arc<Self>) -> RemoteObject;
}

impl RegionLike for Region {
    fn region(&self) -> &Region {
        self
    }

    fn to_object(this: &Arc<Self>) -> RemoteObject {
        RemoteObject::Region(this.clone())
    }
}

impl RegionLike for Match {
    fn region(&self) -> &Region {
        Match::region(self)
    }

    fn to_object(this: &Arc<Self>) -> RemoteObject {
        RemoteObject::Match(this.clone())
    }
}

pub struct Remote<T: RegionLike> {
    inner: Arc<T>,
    registry: Arc<ProxyRegistry>,
}

impl<T: RegionLike> Clone for Remote<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<T: RegionLike> Remote<T> {
    pub fn new(inner: Arc<T>, registry: Arc<ProxyRegistry>) -> Self {
        Self { inner, registry }
    }

    pub fn inner(&self) -> &Arc<T> {
        &self.inner
    }

    pub fn registry(&self) -> &Arc<ProxyRegistry> {
        &self.registry
    }

    /// Handle of the wrapped object, registering it on first use
    pub fn handle(&self) -> GuiResult<Handle> {
        self.registry.register(T::to_object(&self.inner))
    }

    fn reply<V: Proxify>(&self, result: GuiResult<V>) -> RemoteResult {
        let value = result?;
        Ok(self.registry.proxify(value)?)
    }

    fn chained(&self, result: GuiResult<&Region>) -> RemoteResult {
        result?;
        Ok(RemoteValue::Object(self.handle()?))
    }

    fn region(&self) -> &Region {
        self.inner.region()
    }

    pub fn find(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> RemoteResult {
        self.reply(self.region().find(image, timeout))
    }

    pub fn find_all(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
        allow_zero: bool,
    ) -> RemoteResult {
        self.reply(self.region().find_all(image, timeout, allow_zero))
    }

    pub fn exists(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> RemoteResult {
        self.reply(self.region().exists(image, timeout))
    }

    pub fn wait(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> RemoteResult {
        self.reply(self.region().wait(image, timeout))
    }

    pub fn wait_vanish(
        &self,
        image: impl Into<Image>,
        timeout: impl Into<Option<Duration>>,
    ) -> RemoteResult {
        self.reply(self.region().wait_vanish(image, timeout))
    }

    pub fn sample(&self, image: impl Into<Image>) -> RemoteResult {
        self.reply(self.region().sample(image))
    }

    pub fn nearby(&self, margin: u32) -> RemoteResult {
        self.reply(Ok(self.region().nearby(margin)))
    }

    pub fn idle(&self, duration: Duration) -> RemoteResult {
        self.chained(Ok(self.region().idle(duration)))
    }

    pub fn last_match(&self) -> RemoteResult {
        self.reply(Ok(self.region().last_match()))
    }

    pub fn mouse_location(&self) -> RemoteResult {
        self.reply(self.region().mouse_location())
    }

    pub fn hover(&self, target: impl Into<Target>) -> RemoteResult {
        self.chained(self.region().hover(target))
    }

    pub fn click(&self, target: impl Into<Target>, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().click(target, modifiers))
    }

    pub fn right_click(&self, target: impl Into<Target>, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().right_click(target, modifiers))
    }

    pub fn double_click(&self, target: impl Into<Target>, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().double_click(target, modifiers))
    }

    pub fn mouse_down(&self, target: impl Into<Target>, button: MouseButton) -> RemoteResult {
        self.chained(self.region().mouse_down(target, button))
    }

    pub fn mouse_up(&self, target: impl Into<Target>, button: MouseButton) -> RemoteResult {
        self.chained(self.region().mouse_up(target, button))
    }

    pub fn drag_drop(
        &self,
        source: impl Into<Target>,
        destination: impl Into<Target>,
        modifiers: &[Key],
    ) -> RemoteResult {
        self.chained(self.region().drag_drop(source, destination, modifiers))
    }

    pub fn drag_from(&self, target: impl Into<Target>, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().drag_from(target, modifiers))
    }

    pub fn drop_at(&self, target: impl Into<Target>, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().drop_at(target, modifiers))
    }

    pub fn press_keys(&self, keys: &[Key]) -> RemoteResult {
        self.chained(self.region().press_keys(keys))
    }

    pub fn press_at(&self, target: impl Into<Target>, keys: &[Key]) -> RemoteResult {
        self.chained(self.region().press_at(target, keys))
    }

    pub fn type_text(&self, text: &str, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().type_text(text, modifiers))
    }

    pub fn type_at(&self, target: impl Into<Target>, text: &str, modifiers: &[Key]) -> RemoteResult {
        self.chained(self.region().type_at(target, text, modifiers))
    }
}
