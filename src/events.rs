//! Map-session observer context: cell-created and cell-selected subscriptions.
//!
//! One [`HexMapEvents`] lives for the length of a map session. The shape
//! generator reports every admitted cell through it, and selection updates go
//! through [`HexMapEvents::select`].

use std::fmt;

use bevy::prelude::Resource;

use crate::axial::AxialCoord;

type Callback = Box<dyn FnMut(AxialCoord) + Send + Sync>;

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber lists and the currently selected cell of one map session.
#[derive(Resource, Default)]
pub struct HexMapEvents {
    next_id: u64,
    on_created: Vec<(SubscriptionId, Callback)>,
    on_selected: Vec<(SubscriptionId, Callback)>,
    selected: AxialCoord,
}

impl fmt::Debug for HexMapEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HexMapEvents")
            .field("on_created", &self.on_created.len())
            .field("on_selected", &self.on_selected.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl HexMapEvents {
    /// Empty context with `(0, 0)` selected.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Calls `f` once for every cell the shape generator admits.
    pub fn subscribe_created(
        &mut self,
        f: impl FnMut(AxialCoord) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.on_created.push((id, Box::new(f)));
        id
    }

    /// Calls `f` every time a cell is selected.
    pub fn subscribe_selected(
        &mut self,
        f: impl FnMut(AxialCoord) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.on_selected.push((id, Box::new(f)));
        id
    }

    /// Drops a subscription. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.on_created.len() + self.on_selected.len();
        self.on_created.retain(|(sub, _)| *sub != id);
        self.on_selected.retain(|(sub, _)| *sub != id);
        before != self.on_created.len() + self.on_selected.len()
    }

    /// Drops every subscription.
    pub fn clear(&mut self) {
        self.on_created.clear();
        self.on_selected.clear();
    }

    /// Notifies cell-created subscribers.
    pub fn notify_created(&mut self, coord: AxialCoord) {
        for (_, f) in &mut self.on_created {
            f(coord);
        }
    }

    /// Records `coord` as selected, then notifies cell-selected subscribers.
    pub fn select(&mut self, coord: AxialCoord) {
        self.selected = coord;
        for (_, f) in &mut self.on_selected {
            f(coord);
        }
    }

    /// The most recently selected cell.
    pub fn selected(&self) -> AxialCoord {
        self.selected
    }
}
