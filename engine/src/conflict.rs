//! Conflict resolution for name collisions at the destination.
//!
//! The engine never decides a collision on its own. It asks a
//! [`ConflictResolver`] (in practice the decision channel, backed by a
//! person at a prompt) and applies what comes back. A decision marked
//! `remember` becomes the run's [`StickyDecision`] and answers every later
//! collision in that run without asking again.

use std::fmt;

use tracing::debug;

use crate::error::EngineError;

/// How to resolve a single collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictOutcome {
    /// Remove the existing destination file, then transfer.
    Replace,
    /// Leave both files untouched.
    Skip,
    /// Transfer under a uniquified name.
    #[default]
    KeepBoth,
}

impl ConflictOutcome {
    pub const ALL: [ConflictOutcome; 3] = [
        ConflictOutcome::Replace,
        ConflictOutcome::Skip,
        ConflictOutcome::KeepBoth,
    ];

    /// Parse an outcome name as typed on a command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "replace" | "overwrite" => Some(Self::Replace),
            "skip" => Some(Self::Skip),
            "keep-both" | "keep_both" | "keep" | "rename" => Some(Self::KeepBoth),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "Replace existing file"),
            Self::Skip => write!(f, "Skip this file"),
            Self::KeepBoth => write!(f, "Keep both (rename)"),
        }
    }
}

/// An answer to one conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictDecision {
    pub outcome: ConflictOutcome,
    /// Apply `outcome` to every remaining conflict in this run.
    pub remember: bool,
}

impl ConflictDecision {
    pub fn once(outcome: ConflictOutcome) -> Self {
        ConflictDecision {
            outcome,
            remember: false,
        }
    }

    pub fn for_all(outcome: ConflictOutcome) -> Self {
        ConflictDecision {
            outcome,
            remember: true,
        }
    }
}

/// Source of conflict decisions.
///
/// Given only the display name of the colliding file, return what to do.
/// Implementations may block; the engine waits for as long as it takes.
pub trait ConflictResolver: Send {
    fn resolve(&mut self, file_name: &str) -> Result<ConflictDecision, EngineError>;
}

/// The "apply to all" state of one run.
///
/// Built fresh for each run, so a remembered choice never leaks into the
/// next batch.
#[derive(Debug, Default)]
pub struct StickyDecision {
    remembered: Option<ConflictOutcome>,
}

impl StickyDecision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ConflictOutcome> {
        self.remembered
    }

    /// Answer a collision: the remembered outcome if there is one, otherwise
    /// whatever `resolver` says (remembering it if asked to).
    pub fn decide(
        &mut self,
        file_name: &str,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<ConflictOutcome, EngineError> {
        if let Some(outcome) = self.remembered {
            debug!(file = file_name, ?outcome, "applying remembered decision");
            return Ok(outcome);
        }

        let decision = resolver.resolve(file_name)?;
        if decision.remember {
            debug!(outcome = ?decision.outcome, "remembering decision for the rest of the run");
            self.remembered = Some(decision.outcome);
        }
        Ok(decision.outcome)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Resolver that replays a fixed list of answers and records prompts.
    pub(crate) struct ScriptedResolver {
        pub answers: VecDeque<ConflictDecision>,
        pub prompts: Vec<String>,
    }

    impl ScriptedResolver {
        pub fn new(answers: impl IntoIterator<Item = ConflictDecision>) -> Self {
            ScriptedResolver {
                answers: answers.into_iter().collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl ConflictResolver for ScriptedResolver {
        fn resolve(&mut self, file_name: &str) -> Result<ConflictDecision, EngineError> {
            self.prompts.push(file_name.to_string());
            self.answers
                .pop_front()
                .ok_or(EngineError::DecisionChannelClosed)
        }
    }

    #[test]
    fn test_sticky_decision_asks_until_remembered() {
        let mut resolver = ScriptedResolver::new([
            ConflictDecision::once(ConflictOutcome::Replace),
            ConflictDecision::for_all(ConflictOutcome::Skip),
        ]);
        let mut sticky = StickyDecision::new();

        assert_eq!(sticky.decide("a.jpg", &mut resolver).unwrap(), ConflictOutcome::Replace);
        assert_eq!(sticky.get(), None);
        assert_eq!(sticky.decide("b.jpg", &mut resolver).unwrap(), ConflictOutcome::Skip);
        assert_eq!(sticky.get(), Some(ConflictOutcome::Skip));
        assert_eq!(sticky.decide("c.jpg", &mut resolver).unwrap(), ConflictOutcome::Skip);

        assert_eq!(resolver.prompts, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_resolver_failure_propagates() {
        let mut resolver = ScriptedResolver::new([]);
        let mut sticky = StickyDecision::new();
        let result = sticky.decide("a.jpg", &mut resolver);
        assert!(matches!(result, Err(EngineError::DecisionChannelClosed)));
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!(ConflictOutcome::parse("Replace"), Some(ConflictOutcome::Replace));
        assert_eq!(ConflictOutcome::parse("skip"), Some(ConflictOutcome::Skip));
        assert_eq!(ConflictOutcome::parse("keep-both"), Some(ConflictOutcome::KeepBoth));
        assert_eq!(ConflictOutcome::parse("merge"), None);
    }

    #[test]
    fn test_default_decision_keeps_both_once() {
        let decision = ConflictDecision::default();
        assert_eq!(decision.outcome, ConflictOutcome::KeepBoth);
        assert!(!decision.remember);
    }
}
