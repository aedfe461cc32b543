//! Decision protocol: asking one participant to choose.
//!
//! A [`Decision`] pairs a [`DecisionKind`], a [`Context`] and an option set.
//! Asking it:
//!
//! 1. With exactly one option and a kind that does not require
//!    confirmation, the option is taken without consulting anyone.
//! 2. Otherwise the participant receives a [`DecisionView`]: the private
//!    projection of the context and of every option, built for them.
//! 3. The answer must be one of the *projected* options. Its position maps
//!    back to the internal option; when several options project equal, one
//!    of them is picked at random.
//! 4. An unimplemented handler or an answer outside the option set is
//!    logged and replaced by a uniformly random option.
//!
//! Option sets implement [`OptionSet`]: plain lists, or [`Permutations`]
//! for "order these groups" questions, which are never materialized.

mod permutations;

pub use permutations::{PermutationError, Permutations, MAX_ITEMS};

use crate::core::{EngineResult, PlayerId};
use crate::events::Context;
use crate::stack::Game;
use crate::visibility::{Flavor, Projected, View, Visible};

/// What is being decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    /// Which card/option to play this turn.
    WhichPlay,
    /// Acknowledge a set of forced plays.
    MultiPlay,
    /// Who starts the round.
    WhoStarts,
    /// Which held card is involved.
    WhichCard,
    /// Whether (and how) to respond to a fired event.
    QuickPlay,
    /// How to order simultaneous event groups.
    OrderEventGroups,
    /// Decision defined by a card plug-in.
    Custom { name: &'static str, confirm: bool },
}

impl DecisionKind {
    /// Always posed, even with a single option.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        match self {
            Self::WhichPlay | Self::MultiPlay | Self::WhoStarts | Self::OrderEventGroups => true,
            Self::WhichCard | Self::QuickPlay => false,
            Self::Custom { confirm, .. } => *confirm,
        }
    }

    /// Stable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WhichPlay => "WHICH_PLAY",
            Self::MultiPlay => "MULTI_PLAY",
            Self::WhoStarts => "WHO_STARTS",
            Self::WhichCard => "WHICH_CARD",
            Self::QuickPlay => "QUICK_PLAY",
            Self::OrderEventGroups => "ORDER_EVENT_GROUPS",
            Self::Custom { name, .. } => *name,
        }
    }
}

/// A finite set of internal options.
pub trait OptionSet {
    /// What choosing yields.
    type Item;

    /// Number of options.
    fn count(&self) -> usize;

    /// Option at a position.
    fn element_at(&self, index: usize) -> Option<Self::Item>;

    /// Options as the participant sees them.
    fn project(&self, view: &View<'_>) -> OptionsView;
}

impl<T: Visible + Clone> OptionSet for Vec<T> {
    type Item = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn element_at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }

    fn project(&self, view: &View<'_>) -> OptionsView {
        OptionsView::List(self.iter().map(|option| view.project(option)).collect())
    }
}

impl<T: Visible + Clone + PartialEq> OptionSet for Permutations<T> {
    type Item = Vec<T>;

    fn count(&self) -> usize {
        Permutations::count(self)
    }

    fn element_at(&self, index: usize) -> Option<Vec<T>> {
        Permutations::element_at(self, index)
    }

    fn project(&self, view: &View<'_>) -> OptionsView {
        let items = self.items().iter().map(|item| view.project(item)).collect();
        match Permutations::new(items) {
            Ok(projected) => OptionsView::Permutations(projected),
            Err(err) => {
                tracing::warn!(%err, "projected orderings are ambiguous; no answer can be valid");
                OptionsView::List(Vec::new())
            }
        }
    }
}

/// Projected option set handed to a participant.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionsView {
    /// Answer with one of these values.
    List(Vec<Projected>),
    /// Answer with a [`Projected::List`] ordering of these items.
    Permutations(Permutations<Projected>),
}

impl OptionsView {
    /// Number of options.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::List(options) => options.len(),
            Self::Permutations(orders) => orders.count(),
        }
    }

    /// Position of an answer, if it is one of the options.
    #[must_use]
    pub fn index_of(&self, answer: &Projected) -> Option<usize> {
        match (self, answer) {
            (Self::List(options), answer) => options.iter().position(|option| option == answer),
            (Self::Permutations(orders), Projected::List(order)) => orders.index_of(order).ok(),
            (Self::Permutations(_), _) => None,
        }
    }

    /// Positions of every option equal to `answer`.
    ///
    /// Identical copies of a card project equal, so an answer naming one of
    /// them names them all.
    #[must_use]
    pub fn positions_of(&self, answer: &Projected) -> Vec<usize> {
        match self {
            Self::List(options) => options
                .iter()
                .enumerate()
                .filter(|(_, option)| *option == answer)
                .map(|(index, _)| index)
                .collect(),
            Self::Permutations(_) => self.index_of(answer).into_iter().collect(),
        }
    }

    /// Option at a position, as an answer.
    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<Projected> {
        match self {
            Self::List(options) => options.get(index).cloned(),
            Self::Permutations(orders) => orders.element_at(index).map(Projected::List),
        }
    }
}

/// A decision as one participant sees it.
#[derive(Clone, Debug)]
pub struct DecisionView {
    kind: DecisionKind,
    player: PlayerId,
    context: Projected,
    options: OptionsView,
}

impl DecisionView {
    #[must_use]
    pub fn kind(&self) -> DecisionKind {
        self.kind
    }

    /// Who is asked.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Private projection of the context.
    #[must_use]
    pub fn context(&self) -> &Projected {
        &self.context
    }

    /// Private projection of the options.
    #[must_use]
    pub fn options(&self) -> &OptionsView {
        &self.options
    }

    /// Narration of the question.
    #[must_use]
    pub fn narration(&self) -> String {
        self.context.to_string()
    }
}

/// A question for exactly one participant.
pub struct Decision<O> {
    kind: DecisionKind,
    context: Context,
    options: O,
}

impl<O: OptionSet> Decision<O> {
    pub fn new(kind: DecisionKind, context: Context, options: O) -> Self {
        Self { kind, context, options }
    }

    #[must_use]
    pub fn kind(&self) -> DecisionKind {
        self.kind
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Ask `player` and return the chosen internal option.
    ///
    /// `None` only when there are no options at all.
    pub fn ask(self, game: &mut Game, player: PlayerId) -> Option<O::Item> {
        let count = self.options.count();
        if count == 0 {
            tracing::warn!(kind = self.kind.name(), %player, "decision has no options");
            return None;
        }
        if count == 1 && !self.kind.requires_confirmation() {
            return self.options.element_at(0);
        }

        let view = {
            let view = View::new(Flavor::Private, player.into(), game.state());
            DecisionView {
                kind: self.kind,
                player,
                context: view.project(&self.context),
                options: self.options.project(&view),
            }
        };
        tracing::debug!(kind = self.kind.name(), %player, question = %view.narration(), "asking");

        let answer = match game.participant_mut(player) {
            Some(participant) => participant.decide(&view),
            None => Err(crate::participants::Unimplemented),
        };
        let index = match answer {
            Ok(answer) => match view.options.positions_of(&answer).as_slice() {
                [] => {
                    tracing::warn!(kind = self.kind.name(), %player, %answer, "answer is not one of the options; choosing at random");
                    None
                }
                [index] => Some(*index),
                equal => Some(equal[game.state_mut().rng.gen_index(equal.len())]),
            },
            Err(_) => {
                tracing::warn!(kind = self.kind.name(), %player, "participant cannot decide; choosing at random");
                None
            }
        };
        let index = index.unwrap_or_else(|| game.state_mut().rng.gen_index(count));
        self.options.element_at(index)
    }

    /// Ask `player` and apply `outcome` to the choice.
    pub fn ask_then<R>(
        self,
        game: &mut Game,
        player: PlayerId,
        outcome: impl FnOnce(&mut Game, O::Item) -> EngineResult<R>,
    ) -> EngineResult<Option<R>> {
        match self.ask(game, player) {
            Some(choice) => outcome(game, choice).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_kinds() {
        assert!(DecisionKind::WhoStarts.requires_confirmation());
        assert!(DecisionKind::OrderEventGroups.requires_confirmation());
        assert!(!DecisionKind::WhichCard.requires_confirmation());
        assert!(!DecisionKind::QuickPlay.requires_confirmation());
        assert!(DecisionKind::Custom { name: "NOPE", confirm: true }.requires_confirmation());
    }

    #[test]
    fn test_list_view_index() {
        let view = OptionsView::List(vec![Projected::Int(3), Projected::Null]);
        assert_eq!(view.index_of(&Projected::Null), Some(1));
        assert_eq!(view.index_of(&Projected::Int(9)), None);
        assert_eq!(view.answer_at(0), Some(Projected::Int(3)));
    }

    #[test]
    fn test_permutation_view_index() {
        let items = vec![Projected::Int(1), Projected::Int(2)];
        let view = OptionsView::Permutations(Permutations::new(items).unwrap());
        let answer = Projected::List(vec![Projected::Int(2), Projected::Int(1)]);

        assert_eq!(view.count(), 2);
        assert_eq!(view.index_of(&answer), Some(1));
        assert_eq!(view.answer_at(1), Some(answer));
        assert_eq!(view.index_of(&Projected::Int(1)), None);
    }
}
