//! Game state: the entity arena.
//!
//! ## GameState
//!
//! Owns every player and card of one game, the deck and the aside pile,
//! the round bookkeeping and the RNG. Cross references are ids into these
//! arenas. All mutation of players and cards goes through `GameState`
//! methods, which keep the projection caches in step:
//!
//! - player mutations refresh the player's reactive cache
//! - card mutations invalidate the card's lazy cache and refresh its holder
//! - cards entering or leaving a hand invalidate the other held cards, so
//!   observers cannot track which face-down card is which
//!
//! `GameState` is also the [`EntityStore`] the visibility layer resolves
//! ids through.

use std::cell::Cell;
use std::sync::Arc;

use crate::cards::{Card, CardDefinition, PlayOption};
use crate::visibility::{Entity, EntityStore, Flavor, ObserverKey, PlayerTag, Projection, View};

use super::config::GameConfig;
use super::entity::{CardId, IdAllocator, PlayerId};
use super::error::{EngineError, EngineResult, Exhausted};
use super::player::Player;
use super::rng::GameRng;

/// Where a play order starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStart {
    /// With the player after the current player (the default).
    AfterCurrent,
    /// With the player after this one.
    After(PlayerId),
    /// With this player.
    With(PlayerId),
}

/// Complete state of one game.
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    pub(crate) rng: GameRng,
    pub(crate) ids: IdAllocator,

    // === Entities ===
    players: Vec<Player>,
    cards: Vec<Card>,

    /// Seated players in turn order.
    seating: Vec<PlayerId>,

    // === Card pool (top of pile = last) ===
    deck: Vec<CardId>,
    aside: Vec<CardId>,

    // === Round bookkeeping ===
    pub(crate) current_player: Option<PlayerId>,
    pub(crate) active: bool,
    pub(crate) ending: bool,
    pub(crate) round_count: usize,
    pub(crate) round_winner: Option<PlayerId>,
    pub(crate) last_loser: Option<PlayerId>,
    pub(crate) winner: Option<PlayerId>,

    integrity_warnings: Cell<u32>,
}

impl GameState {
    /// Create an empty state.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            rng: GameRng::new(config.seed),
            config,
            ids: IdAllocator::default(),
            players: Vec::new(),
            cards: Vec::new(),
            seating: Vec::new(),
            deck: Vec::new(),
            aside: Vec::new(),
            current_player: None,
            active: false,
            ending: false,
            round_count: 0,
            round_winner: None,
            last_loser: None,
            winner: None,
            integrity_warnings: Cell::new(0),
        }
    }

    /// Game configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // === Entity access ===

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    /// Look up a card.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.index())
    }

    fn player_ref(&self, id: PlayerId) -> EngineResult<&Player> {
        self.player(id).ok_or(EngineError::UnknownPlayer(id))
    }

    fn card_ref(&self, id: CardId) -> EngineResult<&Card> {
        self.card(id).ok_or(EngineError::UnknownCard(id))
    }

    /// Every card in the game, in creation order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Shared definition of a card.
    #[must_use]
    pub fn definition(&self, card: CardId) -> Option<Arc<CardDefinition>> {
        self.card(card).map(|c| Arc::clone(c.def()))
    }

    /// Default play option for a card: its name as the mode, no targets.
    #[must_use]
    pub fn play_option(&self, card: CardId) -> Option<PlayOption> {
        self.card(card).map(|c| PlayOption::new(card, c.def().name.clone()))
    }

    /// Add a card to the game. It starts outside every pile.
    pub fn add_card(&mut self, def: Arc<CardDefinition>) -> CardId {
        let id = self.ids.card();
        self.cards.push(Card::new(id, def));
        id
    }

    /// Create a player record. Not seated until [`GameState::seat`].
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = self.ids.player();
        self.players.push(Player::new(id, name));
        id
    }

    /// Seat a player at a position in turn order (appended if `None`).
    pub fn seat(&mut self, player: PlayerId, at: Option<usize>) -> EngineResult<()> {
        self.player_ref(player)?;
        if self.seating.contains(&player) {
            return Ok(());
        }
        let at = at.unwrap_or(self.seating.len()).min(self.seating.len());
        self.seating.insert(at, player);
        Ok(())
    }

    /// Remove a player from the table.
    pub fn unseat(&mut self, player: PlayerId) {
        self.seating.retain(|p| *p != player);
    }

    /// Seated players in turn order.
    #[must_use]
    pub fn seated(&self) -> &[PlayerId] {
        &self.seating
    }

    /// Seated players still alive, in turn order.
    #[must_use]
    pub fn living(&self) -> Vec<PlayerId> {
        self.seating
            .iter()
            .copied()
            .filter(|p| self.player(*p).is_some_and(Player::is_alive))
            .collect()
    }

    /// Living, unprotected players, minus `excluding`.
    #[must_use]
    pub fn targetable(&self, excluding: &[PlayerId]) -> Vec<PlayerId> {
        self.living()
            .into_iter()
            .filter(|p| !excluding.contains(p))
            .filter(|p| self.player(*p).is_some_and(|player| !player.is_protected()))
            .collect()
    }

    /// Sum of insanity over a player's discard pile.
    #[must_use]
    pub fn insanity(&self, player: PlayerId) -> u32 {
        self.player(player)
            .map(|p| {
                p.discard()
                    .iter()
                    .filter_map(|c| self.card(*c))
                    .map(|c| c.def().insane)
                    .sum()
            })
            .unwrap_or(0)
    }

    // === Round bookkeeping ===

    /// Whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    /// Is a round running?
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Rounds started so far.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.round_count
    }

    /// Winner of the last round, if it had one.
    #[must_use]
    pub fn round_winner(&self) -> Option<PlayerId> {
        self.round_winner
    }

    /// First player to die in the last round that had a death.
    #[must_use]
    pub fn last_loser(&self) -> Option<PlayerId> {
        self.last_loser
    }

    /// Winner of the game.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Number of values the visibility layer could not classify.
    #[must_use]
    pub fn integrity_warnings(&self) -> u32 {
        self.integrity_warnings.get()
    }

    // === Turn order ===

    /// Players of `among` (default: the living) in turn order from `start`.
    #[must_use]
    pub fn play_order(&self, among: Option<&[PlayerId]>, start: OrderStart) -> Vec<PlayerId> {
        let living;
        let among = match among {
            Some(among) => among,
            None => {
                living = self.living();
                &living
            }
        };
        let n = self.seating.len();
        if n == 0 {
            return Vec::new();
        }
        let position = |p: PlayerId| self.seating.iter().position(|s| *s == p);
        let first = match start {
            OrderStart::AfterCurrent => match self.current_player.and_then(position) {
                Some(i) => i + 1,
                None => {
                    tracing::debug!("no current player yet; play order starts at the first seat");
                    0
                }
            },
            OrderStart::After(p) => position(p).map_or(0, |i| i + 1),
            OrderStart::With(p) => position(p).unwrap_or(0),
        };
        (0..n)
            .map(|j| self.seating[(first + j) % n])
            .filter(|p| among.contains(p))
            .collect()
    }

    /// Turns until `player` would play, counting the current player as 0.
    #[must_use]
    pub fn turns_til(&self, player: PlayerId) -> Option<usize> {
        let current = self.current_player?;
        let n = self.seating.len();
        let cur = self.seating.iter().position(|p| *p == current)?;
        (0..n).find(|i| self.seating[(cur + i) % n] == player)
    }

    /// Order in which `among` may respond to an event.
    ///
    /// Targets other than the current player come first, nearest turn
    /// first; then everyone else in play order.
    #[must_use]
    pub fn priority_order(&self, targets: &[PlayerId], among: &[PlayerId]) -> Vec<PlayerId> {
        if among.len() <= 1 {
            return among.to_vec();
        }
        let mut order: Vec<PlayerId> = Vec::new();
        for target in targets {
            if Some(*target) != self.current_player && among.contains(target) && !order.contains(target) {
                order.push(*target);
            }
        }
        order.sort_by_key(|p| self.turns_til(*p).unwrap_or(usize::MAX));
        for player in self.play_order(None, OrderStart::AfterCurrent) {
            if among.contains(&player) && !order.contains(&player) {
                order.push(player);
            }
        }
        // Dead players asked about explicitly still get a slot.
        for player in among {
            if !order.contains(player) {
                order.push(*player);
            }
        }
        order
    }

    /// Seat after `player`, wrapping around.
    #[must_use]
    pub fn next_seat(&self, player: PlayerId) -> Option<PlayerId> {
        let i = self.seating.iter().position(|p| *p == player)?;
        self.seating.get((i + 1) % self.seating.len()).copied()
    }

    // === Projections ===

    /// A player's projection for `observer`, honoring the self-view rule.
    #[must_use]
    pub fn player_view(
        &self,
        player: PlayerId,
        flavor: Flavor,
        observer: impl Into<ObserverKey>,
    ) -> Option<Arc<Projection>> {
        let record = self.player(player)?;
        let observer = observer.into();
        let flavor = record.effective_flavor(flavor, observer);
        Some(
            record
                .cache
                .get_or_build(flavor, observer, || record.build_projection(&View::new(flavor, observer, self))),
        )
    }

    /// Rebuild every issued projection of a player.
    pub(crate) fn refresh_player(&self, player: PlayerId) {
        if let Some(record) = self.player(player) {
            record
                .cache
                .refresh(|flavor, observer| record.build_projection(&View::new(flavor, observer, self)));
        }
    }

    /// Invalidate a card's projections (one flavor or both) and refresh its holder.
    pub fn invalidate_card(&self, card: CardId, flavor: Option<Flavor>) {
        let Some(record) = self.card(card) else {
            return;
        };
        match flavor {
            Some(flavor) => record.cache.invalidate(flavor),
            None => record.cache.invalidate_all(),
        }
        if let Some(holder) = record.holder() {
            self.refresh_player(holder);
        }
    }

    // === Mutation ===

    /// Mutate a player, then refresh every projection issued for them.
    pub fn update_player<R>(&mut self, player: PlayerId, f: impl FnOnce(&mut Player) -> R) -> EngineResult<R> {
        let record = self
            .players
            .get_mut(player.index())
            .ok_or(EngineError::UnknownPlayer(player))?;
        let out = f(record);
        self.refresh_player(player);
        Ok(out)
    }

    /// Mutate a card, then invalidate it.
    pub(crate) fn update_card<R>(&mut self, card: CardId, f: impl FnOnce(&mut Card) -> R) -> EngineResult<R> {
        let record = self.cards.get_mut(card.index()).ok_or(EngineError::UnknownCard(card))?;
        let out = f(record);
        self.invalidate_card(card, None);
        Ok(out)
    }

    /// Reset every seated player for a new round.
    pub(crate) fn reset_players(&mut self) -> EngineResult<()> {
        for player in self.seating.clone() {
            self.update_player(player, Player::reset)?;
        }
        Ok(())
    }

    // === Zones ===

    fn invalidate_hand_public(&self, player: PlayerId) {
        if let Some(record) = self.player(player) {
            for card in record.hand() {
                if let Some(c) = self.card(*card) {
                    c.cache.invalidate(Flavor::Public);
                }
            }
        }
    }

    fn enter_zone(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.update_card(card, |c| {
            c.holder = Some(player);
            c.controller = Some(player);
        })?;
        self.refresh_player(player);
        let def = Arc::clone(self.card_ref(card)?.def());
        def.on_enter_zone(self, card);
        Ok(())
    }

    fn leave_zone(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.update_card(card, Card::reset)?;
        self.refresh_player(player);
        let def = Arc::clone(self.card_ref(card)?.def());
        def.on_leave_zone(self, card);
        Ok(())
    }

    /// Put a card into a player's hand.
    pub fn give(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.card_ref(card)?;
        self.invalidate_hand_public(player);
        self.update_player(player, |p| p.hand.push(card))?;
        self.enter_zone(player, card)
    }

    /// Take a card out of a player's hand.
    pub fn take(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.remove_from(player, card, "hand")?;
        self.leave_zone(player, card)?;
        self.invalidate_hand_public(player);
        self.refresh_player(player);
        Ok(())
    }

    /// Move a card from a player's hand to their discard pile.
    ///
    /// The card never leaves its holder, so no leave-zone hook runs.
    pub fn hand_to_discard(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.remove_from(player, card, "hand")?;
        self.put_in_discard(player, card)?;
        self.invalidate_hand_public(player);
        self.refresh_player(player);
        Ok(())
    }

    /// Put a card face up on a player's discard pile.
    pub fn put_in_discard(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.card_ref(card)?;
        self.update_player(player, |p| p.discard.push(card))?;
        self.update_card(card, |c| c.discarded = true)?;
        self.enter_zone(player, card)
    }

    /// Take a card back out of a player's discard pile.
    pub fn take_from_discard(&mut self, player: PlayerId, card: CardId) -> EngineResult<()> {
        self.remove_from(player, card, "discard")?;
        self.leave_zone(player, card)
    }

    /// Take a card from whoever holds it, if anyone.
    pub fn take_from_holder(&mut self, card: CardId) -> EngineResult<()> {
        let record = self.card_ref(card)?;
        match (record.holder(), record.is_discarded()) {
            (Some(holder), false) => self.take(holder, card),
            (Some(holder), true) => self.take_from_discard(holder, card),
            (None, _) => Ok(()),
        }
    }

    fn remove_from(&mut self, player: PlayerId, card: CardId, zone: &'static str) -> EngineResult<()> {
        let removed = self.update_player(player, |p| {
            let pile = if zone == "hand" { &mut p.hand } else { &mut p.discard };
            match pile.iter().position(|c| *c == card) {
                Some(i) => {
                    pile.remove(i);
                    true
                }
                None => false,
            }
        })?;
        if removed {
            Ok(())
        } else {
            Err(EngineError::NotInZone { card, player, zone })
        }
    }

    // === Deck ===

    /// Cards in the deck, bottom first.
    #[must_use]
    pub fn deck(&self) -> &[CardId] {
        &self.deck
    }

    /// Cards set aside this round.
    #[must_use]
    pub fn aside(&self) -> &[CardId] {
        &self.aside
    }

    /// Shuffle the deck in place.
    pub fn shuffle(&mut self) {
        self.rng.shuffle(&mut self.deck);
    }

    /// Shuffle a card into the deck. Every deck card becomes untrackable.
    pub fn shuffle_in(&mut self, card: CardId) -> EngineResult<()> {
        self.card_ref(card)?;
        self.deck.push(card);
        self.shuffle();
        for c in self.deck.clone() {
            self.invalidate_card(c, None);
        }
        Ok(())
    }

    /// Remove and return the top card of the deck.
    ///
    /// With `from_aside`, an empty deck falls back to the aside pile.
    pub fn draw(&mut self, from_aside: bool) -> Result<CardId, Exhausted> {
        if let Some(card) = self.deck.pop() {
            return Ok(card);
        }
        if from_aside {
            return self.aside.pop().ok_or(Exhausted { resource: "aside" });
        }
        Err(Exhausted { resource: "deck" })
    }

    /// Gather every card back into a shuffled deck and set some aside.
    pub fn reset_deck(&mut self) {
        for card in &mut self.cards {
            card.reset();
        }
        self.deck = self.cards.iter().map(Card::id).collect();
        self.aside.clear();
        self.shuffle();
        for _ in 0..self.config.aside_count {
            match self.deck.pop() {
                Some(card) => self.aside.push(card),
                None => break,
            }
        }
    }

    /// Move cards of the given kinds to the top of the deck, first kind on top.
    pub fn stack_deck(&mut self, kinds: &[String]) {
        tracing::info!(?kinds, "stacking the deck");
        let mut top: Vec<CardId> = Vec::new();
        for kind in kinds {
            let found = self.deck.iter().copied().find(|c| {
                !top.contains(c) && self.card(*c).is_some_and(|card| &card.def().kind == kind)
            });
            match found {
                Some(card) => top.push(card),
                None => tracing::warn!(%kind, "deck stacking could not find enough cards"),
            }
        }
        self.deck.retain(|c| !top.contains(c));
        self.deck.extend(top.into_iter().rev());
    }
}

impl EntityStore for GameState {
    fn card_projection(&self, card: CardId, flavor: Flavor, observer: ObserverKey) -> Option<Arc<Projection>> {
        let record = self.card(card)?;
        Some(
            record
                .cache
                .get_or_build(flavor, observer, || record.build_projection(&View::new(flavor, observer, self))),
        )
    }

    fn player_tag(&self, player: PlayerId) -> Option<PlayerTag> {
        self.player(player).map(|p| PlayerTag::new(player, p.name()))
    }

    fn integrity_warning(&self, detail: &str) {
        tracing::warn!(detail, "visibility integrity warning: value passed through unprojected");
        self.integrity_warnings.set(self.integrity_warnings.get() + 1);
    }
}
