//! Optional decision source backed by an external language model.
//! Any failure maps back to the rule-based behavior at the call site.

use super::DecisionContext;
use crate::error::OracleError;
use crate::types::{ActionTag, EntityId};

pub trait DecisionOracle {
    fn decide(&self, entity: EntityId, ctx: &DecisionContext<'_>) -> Result<ActionTag, OracleError>;
}

/// Black-box text completion, such as a local model endpoint.
pub trait Completion {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Oracle that renders the decision inputs as a compact prompt and parses a one-word reply.
pub struct PromptOracle<C> {
    completion: C,
}

impl<C: Completion> PromptOracle<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }
}

impl<C: Completion> DecisionOracle for PromptOracle<C> {
    fn decide(&self, _entity: EntityId, ctx: &DecisionContext<'_>) -> Result<ActionTag, OracleError> {
        let reply = self.completion.complete(&describe(ctx))?;
        parse_action(&reply)
    }
}

pub fn describe(ctx: &DecisionContext<'_>) -> String {
    format!(
        "steps={} range={:.1} hp={:.2} aggression={:.2} hostile={} \
         choose one of: flee attack approach wander talk none",
        ctx.steps_to_target(),
        ctx.range_to_target(),
        ctx.hp_ratio,
        ctx.personality.aggression(),
        ctx.hostile,
    )
}

/// Reads the first word of a reply as an action. Feature-seeking and draining are variant
/// behaviors and are never accepted from the oracle.
pub fn parse_action(reply: &str) -> Result<ActionTag, OracleError> {
    let word = reply
        .split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| !c.is_ascii_alphabetic()).to_ascii_lowercase())
        .unwrap_or_default();
    match word.as_str() {
        "flee" => Ok(ActionTag::Flee),
        "attack" => Ok(ActionTag::Attack),
        "approach" => Ok(ActionTag::Approach),
        "wander" => Ok(ActionTag::Wander),
        "talk" => Ok(ActionTag::Talk),
        "none" | "wait" => Ok(ActionTag::None),
        _ => Err(OracleError::Unparseable(reply.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BalanceConfig;
    use crate::grid::Grid;
    use crate::personality::{Personality, Temperament};
    use crate::types::{Pos, TileKind};

    struct Canned(Result<String, OracleError>);

    impl Completion for Canned {
        fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
            self.0.clone()
        }
    }

    #[test]
    fn parse_accepts_first_word_case_insensitively() {
        assert_eq!(parse_action("Attack! the traveller"), Ok(ActionTag::Attack));
        assert_eq!(parse_action("  wait"), Ok(ActionTag::None));
        assert!(matches!(parse_action("seek the grove"), Err(OracleError::Unparseable(_))));
        assert!(matches!(parse_action(""), Err(OracleError::Unparseable(_))));
    }

    #[test]
    fn prompt_oracle_propagates_completion_failure() {
        let grid = Grid::new(3, 3, TileKind::Grass);
        let config = BalanceConfig::default();
        let personality = Personality::preset(Temperament::Chatty);
        let ctx = DecisionContext {
            grid: &grid,
            config: &config,
            personality: &personality,
            position: Pos { y: 0, x: 0 },
            target: Pos { y: 0, x: 2 },
            hp_ratio: 1.0,
            hostile: true,
        };
        assert!(describe(&ctx).starts_with("steps=2 range=2.0"));
        let entity = EntityId::default();
        let ok = PromptOracle::new(Canned(Ok("approach".into())));
        assert_eq!(ok.decide(entity, &ctx), Ok(ActionTag::Approach));
        let down = PromptOracle::new(Canned(Err(OracleError::Unavailable("timeout".into()))));
        assert_eq!(down.decide(entity, &ctx), Err(OracleError::Unavailable("timeout".into())));
    }
}
