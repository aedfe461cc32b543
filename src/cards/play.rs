//! Play options: one concrete way of playing one card.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId};
use crate::visibility::{Projected, Projection, View, Visible};

use super::attributes::{Param, Params};

/// How strongly a play option is forced on its holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Forcing {
    /// Optional.
    Unforced,
    /// Forced, but the holder chooses among forced options.
    Forced,
    /// Every option at this level must be played.
    AllForced,
}

/// A concrete play: card, mode, targets and parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayOption {
    /// The card being played.
    pub card: CardId,

    /// Mode of play (defaults to the card's name).
    pub mode: String,

    /// Targeted players, in the order the card lists them.
    pub targets: Vec<PlayerId>,

    /// Card-specific parameters.
    pub parameters: Params,

    /// Out-of-turn play in response to another event.
    pub quick: bool,

    /// Can this play be countered?
    pub can_nope: bool,

    /// Narration template overriding the default card-play template.
    pub label: Option<String>,
}

impl PlayOption {
    /// Create an untargeted option.
    pub fn new(card: CardId, mode: impl Into<String>) -> Self {
        Self {
            card,
            mode: mode.into(),
            targets: Vec::new(),
            parameters: Params::new(),
            quick: false,
            can_nope: true,
            label: None,
        }
    }

    /// Add a target (builder pattern).
    #[must_use]
    pub fn targeting(mut self, player: PlayerId) -> Self {
        self.targets.push(player);
        self
    }

    /// Add a parameter (builder pattern).
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Mark as a quick (out-of-turn) play.
    #[must_use]
    pub fn quick(mut self) -> Self {
        self.quick = true;
        self
    }

    /// Mark as uncounterable.
    #[must_use]
    pub fn uncounterable(mut self) -> Self {
        self.can_nope = false;
        self
    }

    /// Override the narration template.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// First target only.
    #[must_use]
    pub fn target(&self) -> Option<PlayerId> {
        self.targets.first().copied()
    }

    /// Look up a parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Param> {
        self.parameters.get(key)
    }

    /// Projection without the card attribute.
    ///
    /// Used when the option is itself nested inside its card's projection.
    pub(crate) fn project_detached(&self, view: &View<'_>) -> Projected {
        Projected::Entity(self.build(view, false).into())
    }

    fn build(&self, view: &View<'_>, with_card: bool) -> Projection {
        let mut builder = Projection::builder("play_option", view.flavor(), view.observer());
        let card = view.project(&self.card);
        if with_card {
            builder = builder.attr("card", card.clone());
        }
        let targets = view.project(&self.targets);
        let parameters = view.project(&self.parameters);
        let mut label = if with_card {
            format!("{card} played as {} targeting {targets}", self.mode)
        } else {
            format!("played as {} targeting {targets}", self.mode)
        };
        if !self.parameters.is_empty() {
            label.push_str(&format!(" with {parameters}"));
        }
        builder
            .attr("mode", Projected::Text(self.mode.clone()))
            .attr("targets", targets)
            .attr("parameters", parameters)
            .attr("quick", Projected::Bool(self.quick))
            .attr("can_nope", Projected::Bool(self.can_nope))
            .label(label)
            .build()
    }
}

impl Visible for PlayOption {
    fn project(&self, view: &View<'_>) -> Projected {
        Projected::Entity(self.build(view, true).into())
    }
}
