//! Ordering simultaneous events.
//!
//! When several events become ready at once (the post-events of one
//! resolution, say), each one's group is owned by the player its context is
//! about. Owners are taken in priority order; an owner of more than one
//! group chooses how to order them. Events of one group stay together.
//! Groups nobody owns keep their original order, after everyone else's.

use rustc_hash::FxHashMap;

use crate::core::{EventId, GroupId, PlayerId};
use crate::decisions::{Decision, DecisionKind, Permutations};
use crate::events::Context;
use crate::visibility::{Projected, View, Visible};

use super::Game;

/// A group of events offered for ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct EventGroup {
    pub id: GroupId,
    pub contexts: Vec<Context>,
}

impl Visible for EventGroup {
    fn project(&self, view: &View<'_>) -> Projected {
        let mut map = std::collections::BTreeMap::new();
        map.insert("group".to_string(), Projected::Text(self.id.to_string()));
        map.insert("events".to_string(), view.project(&self.contexts));
        Projected::Map(map)
    }
}

impl Game {
    /// Order `events`, queued on behalf of `main`, for resolution.
    pub(super) fn order_events(&mut self, main: EventId, events: &[EventId]) -> Vec<EventId> {
        let group_of = |game: &Game, uid: &EventId| game.events.get(uid).and_then(|event| event.group);

        let mut owners: Vec<PlayerId> = Vec::new();
        let mut owned: FxHashMap<PlayerId, Vec<GroupId>> = FxHashMap::default();
        let mut seen: Vec<GroupId> = Vec::new();
        for uid in events {
            let Some(group) = group_of(self, uid) else {
                continue;
            };
            if seen.contains(&group) {
                continue;
            }
            seen.push(group);
            let owner = self.events.get(uid).and_then(|event| event.context().player());
            if let Some(owner) = owner {
                if !owners.contains(&owner) {
                    owners.push(owner);
                }
                owned.entry(owner).or_default().push(group);
            }
        }

        let targets: Vec<PlayerId> = self
            .events
            .get(&main)
            .map(|event| event.context().targets().to_vec())
            .unwrap_or_default();

        let mut ordered: Vec<EventId> = Vec::with_capacity(events.len());
        for owner in self.state.priority_order(&targets, &owners) {
            let groups = owned.remove(&owner).unwrap_or_default();
            let groups = if groups.len() > 1 {
                self.ask_group_order(owner, groups, events)
            } else {
                groups
            };
            for group in groups {
                for uid in events {
                    if group_of(self, uid) == Some(group) && !ordered.contains(uid) {
                        ordered.push(*uid);
                    }
                }
            }
        }
        for uid in events {
            if !ordered.contains(uid) {
                ordered.push(*uid);
            }
        }
        ordered
    }

    fn ask_group_order(&mut self, owner: PlayerId, groups: Vec<GroupId>, events: &[EventId]) -> Vec<GroupId> {
        let items: Vec<EventGroup> = groups
            .iter()
            .map(|group| EventGroup {
                id: *group,
                contexts: events
                    .iter()
                    .filter_map(|uid| self.events.get(uid))
                    .filter(|event| event.group == Some(*group))
                    .map(|event| event.context().clone())
                    .collect(),
            })
            .collect();
        let orders = match Permutations::new(items) {
            Ok(orders) => orders,
            Err(err) => {
                tracing::warn!(%owner, %err, "cannot offer an ordering; keeping registration order");
                return groups;
            }
        };
        let decision = Decision::new(
            DecisionKind::OrderEventGroups,
            Context::OrderEventGroups { player: owner },
            orders,
        );
        match decision.ask(self, owner) {
            Some(order) => order.into_iter().map(|group| group.id).collect(),
            None => groups,
        }
    }
}
