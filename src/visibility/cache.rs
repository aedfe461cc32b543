//! Per-observer projection caches.
//!
//! Both caches use interior mutability: projections are requested through
//! shared references to the state while it is being read.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Flavor, ObserverKey, Projection};

type SlotKey = (Flavor, ObserverKey);

#[derive(Debug)]
struct LazySlot {
    projection: Arc<Projection>,
    valid: bool,
}

/// Cache that marks projections invalid and rebuilds them on next request.
#[derive(Debug, Default)]
pub struct LazyCache {
    slots: RefCell<FxHashMap<SlotKey, LazySlot>>,
}

impl LazyCache {
    /// Return the cached projection, building it if missing or invalid.
    ///
    /// `build` must not touch this cache.
    pub fn get_or_build(
        &self,
        flavor: Flavor,
        observer: ObserverKey,
        build: impl FnOnce() -> Projection,
    ) -> Arc<Projection> {
        let key = (flavor, observer);
        {
            let slots = self.slots.borrow();
            if let Some(slot) = slots.get(&key).filter(|slot| slot.valid) {
                return Arc::clone(&slot.projection);
            }
        }
        let projection = Arc::new(build());
        self.slots.borrow_mut().insert(
            key,
            LazySlot {
                projection: Arc::clone(&projection),
                valid: true,
            },
        );
        projection
    }

    /// Invalidate one flavor for every observer.
    pub fn invalidate(&self, flavor: Flavor) {
        for ((slot_flavor, _), slot) in self.slots.borrow_mut().iter_mut() {
            if *slot_flavor == flavor {
                slot.valid = false;
            }
        }
    }

    /// Invalidate one flavor for one observer.
    pub fn invalidate_for(&self, flavor: Flavor, observer: ObserverKey) {
        if let Some(slot) = self.slots.borrow_mut().get_mut(&(flavor, observer)) {
            slot.valid = false;
        }
    }

    /// Invalidate everything.
    pub fn invalidate_all(&self) {
        for slot in self.slots.borrow_mut().values_mut() {
            slot.valid = false;
        }
    }

    /// Is there a valid cached projection for this slot?
    #[must_use]
    pub fn is_valid(&self, flavor: Flavor, observer: ObserverKey) -> bool {
        self.slots
            .borrow()
            .get(&(flavor, observer))
            .is_some_and(|slot| slot.valid)
    }
}

/// Cache that rebuilds every issued projection as soon as the owner mutates.
#[derive(Debug, Default)]
pub struct ReactiveCache {
    slots: RefCell<FxHashMap<SlotKey, Arc<Projection>>>,
}

impl ReactiveCache {
    /// Return the cached projection, building it the first time this slot is asked for.
    ///
    /// `build` must not touch this cache.
    pub fn get_or_build(
        &self,
        flavor: Flavor,
        observer: ObserverKey,
        build: impl FnOnce() -> Projection,
    ) -> Arc<Projection> {
        let key = (flavor, observer);
        if let Some(projection) = self.slots.borrow().get(&key) {
            return Arc::clone(projection);
        }
        let projection = Arc::new(build());
        self.slots.borrow_mut().insert(key, Arc::clone(&projection));
        projection
    }

    /// Rebuild every issued projection.
    ///
    /// Work is proportional to the number of observers holding one.
    pub fn refresh(&self, mut rebuild: impl FnMut(Flavor, ObserverKey) -> Projection) {
        let keys: Vec<SlotKey> = self.slots.borrow().keys().copied().collect();
        for (flavor, observer) in keys {
            let projection = Arc::new(rebuild(flavor, observer));
            self.slots.borrow_mut().insert((flavor, observer), projection);
        }
    }

    /// Current projection for a slot, without building one.
    #[must_use]
    pub fn peek(&self, flavor: Flavor, observer: ObserverKey) -> Option<Arc<Projection>> {
        self.slots.borrow().get(&(flavor, observer)).cloned()
    }

    /// Number of observers holding a projection.
    #[must_use]
    pub fn observers(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Forget every issued projection.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }
}
