//! Information distribution: the observable history of a game.
//!
//! ## Info records
//!
//! An [`InfoRecord`] is emitted when an event first fires (for contexts
//! that announce themselves) and when it resolves. At emission the record
//! captures both the public and the private projection of its context, so
//! every later delivery (live, or replayed to a participant who joins
//! later) hands out exactly the same values. Which of the two a
//! participant receives is settled by the context's [`Audience`].
//!
//! ## History
//!
//! [`InfoLog`] is append-only. It keeps the whole game and marks where the
//! current round started; both histories can be replayed. Each record is
//! delivered to each participant at most once unless delivery is forced.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::core::{EventId, InfoId, PlayerId};
use crate::events::{Audience, Context};
use crate::visibility::{EntityStore, Flavor, ObserverKey, Projected, View, Visible};

/// When in its event's lifecycle a record was emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Fired,
    Resolved,
}

/// Which history to replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryScope {
    Round,
    Game,
}

/// One observable occurrence.
#[derive(Clone, Debug)]
pub struct InfoRecord {
    id: InfoId,
    stage: Stage,
    event: Option<EventId>,
    kind: String,
    audience: Audience,
    public: Projected,
    private: Projected,
}

impl InfoRecord {
    /// Capture a context as it is now.
    pub(crate) fn capture(
        id: InfoId,
        stage: Stage,
        event: Option<EventId>,
        context: &Context,
        store: &dyn EntityStore,
    ) -> Self {
        let public = context.project(&View::new(Flavor::Public, ObserverKey::Spectator, store));
        let private = context.project(&View::new(Flavor::Private, ObserverKey::Spectator, store));
        Self {
            id,
            stage,
            event,
            kind: context.kind().to_string(),
            audience: context.audience(),
            public,
            private,
        }
    }

    #[must_use]
    pub fn id(&self) -> InfoId {
        self.id
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Event the record came from.
    #[must_use]
    pub fn event(&self) -> Option<EventId> {
        self.event
    }

    /// Context kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    /// Flavor `player` is entitled to.
    #[must_use]
    pub fn flavor_for(&self, player: PlayerId) -> Flavor {
        if self.audience.includes(player) {
            Flavor::Private
        } else {
            Flavor::Public
        }
    }

    /// Captured context projection of a flavor.
    #[must_use]
    pub fn context(&self, flavor: Flavor) -> &Projected {
        match flavor {
            Flavor::Public => &self.public,
            Flavor::Private => &self.private,
        }
    }

    /// What `player` receives.
    #[must_use]
    pub fn view_for(&self, player: PlayerId) -> InfoView {
        let flavor = self.flavor_for(player);
        InfoView {
            id: self.id,
            stage: self.stage,
            flavor,
            context: self.context(flavor).clone(),
        }
    }
}

/// An info record as delivered to one participant.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoView {
    pub id: InfoId,
    pub stage: Stage,
    pub flavor: Flavor,
    pub context: Projected,
}

impl InfoView {
    /// Narration in the delivered flavor.
    #[must_use]
    pub fn narration(&self) -> String {
        self.context.to_string()
    }
}

/// Append-only history with per-participant delivery tracking.
#[derive(Clone, Debug, Default)]
pub struct InfoLog {
    records: im::Vector<Arc<InfoRecord>>,
    round_start: usize,
    sent: FxHashSet<(InfoId, PlayerId)>,
}

impl InfoLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: InfoRecord) -> Arc<InfoRecord> {
        let record = Arc::new(record);
        self.records.push_back(Arc::clone(&record));
        record
    }

    /// Start a fresh round history. The game history keeps everything.
    pub fn start_round(&mut self) {
        self.round_start = self.records.len();
    }

    /// Snapshot of a history, oldest first.
    #[must_use]
    pub fn history(&self, scope: HistoryScope) -> im::Vector<Arc<InfoRecord>> {
        match scope {
            HistoryScope::Game => self.records.clone(),
            HistoryScope::Round => self.records.skip(self.round_start),
        }
    }

    /// Records in the game so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&Arc<InfoRecord>> {
        self.records.back()
    }

    /// Has `record` reached `player`?
    #[must_use]
    pub fn was_sent(&self, record: InfoId, player: PlayerId) -> bool {
        self.sent.contains(&(record, player))
    }

    /// Note a delivery. Returns false if it had already happened.
    pub fn mark_sent(&mut self, record: InfoId, player: PlayerId) -> bool {
        self.sent.insert((record, player))
    }
}
