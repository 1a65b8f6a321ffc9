//! Navigation state machine for the county audit wizard.
//!
//! The wizard walks an audit board through three stages: picking up the
//! next batch of ballots (`List`), entering the interpretation for one
//! ballot (`BallotAudit`), and reviewing the entered interpretation
//! before submitting it (`Review`). Submission itself is not a wizard
//! transition: it is a one-way action fired from inside the review
//! stage, and the wizard moves on without waiting for the outcome.
//!
//! The transition function is pure; UI side effects are returned as data
//! and drained by the caller.

use crate::ballot::CvrId;
use crate::model::AuditError;

/// The stage the wizard is currently presenting.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum WizardStage {
    List,
    BallotAudit,
    Review,
}

impl WizardStage {
    pub const ALL: [WizardStage; 3] = [
        WizardStage::List,
        WizardStage::BallotAudit,
        WizardStage::Review,
    ];
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

/// UI side effects emitted by the navigator.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Effect {
    ScrollToTop,
}

/// The transition table. `None` means the table has no entry for this
/// pair, which the wizard treats as "re-apply the current stage".
///
/// Going forward from `Review` loops back to `BallotAudit`: the design
/// treats it as "go audit another (or the same) ballot again", not
/// "finish". `List` is the entry point and has nowhere to go back to.
pub fn transition(stage: WizardStage, direction: Direction) -> Option<WizardStage> {
    match (direction, stage) {
        (Direction::Forward, WizardStage::List) => Some(WizardStage::BallotAudit),
        (Direction::Forward, WizardStage::BallotAudit) => Some(WizardStage::Review),
        (Direction::Forward, WizardStage::Review) => Some(WizardStage::BallotAudit),
        (Direction::Backward, WizardStage::BallotAudit) => Some(WizardStage::List),
        (Direction::Backward, WizardStage::Review) => Some(WizardStage::BallotAudit),
        (Direction::Backward, WizardStage::List) => None,
    }
}

/// Checks the transition table for stranding: every target must be a
/// known stage, the entry stage must be reachable by retreating from
/// anywhere, and the only missing entry is the backward one out of
/// `List`.
pub fn verify_transition_tables() -> Result<(), AuditError> {
    for stage in WizardStage::ALL {
        if transition(stage, Direction::Forward).is_none() {
            return Err(AuditError::InvalidTransitionTable(format!(
                "no forward transition out of {:?}",
                stage
            )));
        }
        match transition(stage, Direction::Backward) {
            None if stage == WizardStage::List => {}
            None => {
                return Err(AuditError::InvalidTransitionTable(format!(
                    "no backward transition out of {:?}",
                    stage
                )));
            }
            Some(_) => {}
        }

        // Retreating repeatedly must land on the entry stage.
        let mut cur = stage;
        for _ in 0..WizardStage::ALL.len() {
            match transition(cur, Direction::Backward) {
                Some(next) => cur = next,
                None => break,
            }
        }
        if cur != WizardStage::List {
            return Err(AuditError::InvalidTransitionTable(format!(
                "{:?} is stranded: retreating does not reach the ballot list",
                stage
            )));
        }
    }
    Ok(())
}

/// The wizard navigator. Holds only the current stage tag; ballot and
/// assignment context is owned by the enclosing page and passed through
/// to whichever stage view is active.
#[derive(Debug)]
pub struct Wizard {
    stage: WizardStage,
    effects: Vec<Effect>,
}

impl Wizard {
    /// Mounts the wizard. When a ballot is already under review (e.g.
    /// the page was reloaded mid-audit), the wizard opens directly on
    /// the audit stage and asks for a scroll to the top of the page.
    pub fn new(reviewing: Option<CvrId>) -> Wizard {
        debug_assert!(verify_transition_tables().is_ok());
        let mut effects = Vec::new();
        let stage = match reviewing {
            Some(cvr_id) => {
                log::debug!("wizard: resuming audit of ballot {}", cvr_id);
                effects.push(Effect::ScrollToTop);
                WizardStage::BallotAudit
            }
            None => WizardStage::List,
        };
        Wizard { stage, effects }
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    /// Moves to the next stage in the forward table.
    pub fn advance(&mut self) -> WizardStage {
        self.step(Direction::Forward)
    }

    /// Moves to the previous stage in the backward table.
    pub fn retreat(&mut self) -> WizardStage {
        self.step(Direction::Backward)
    }

    fn step(&mut self, direction: Direction) -> WizardStage {
        // A missing table entry re-applies the current stage unchanged.
        self.stage = transition(self.stage, direction).unwrap_or(self.stage);
        // The scroll happens on every navigation event, no-ops included.
        self.effects.push(Effect::ScrollToTop);
        self.stage
    }

    /// Drains the pending UI effects, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_valid() {
        assert_eq!(verify_transition_tables(), Ok(()));
    }

    #[test]
    fn forward_transitions() {
        let mut w = Wizard::new(None);
        assert_eq!(w.stage(), WizardStage::List);
        assert_eq!(w.advance(), WizardStage::BallotAudit);
        assert_eq!(w.advance(), WizardStage::Review);
        // Forward from review loops back to auditing a ballot.
        assert_eq!(w.advance(), WizardStage::BallotAudit);
    }

    #[test]
    fn backward_transitions() {
        let mut w = Wizard::new(None);
        w.advance();
        w.advance();
        assert_eq!(w.stage(), WizardStage::Review);
        assert_eq!(w.retreat(), WizardStage::BallotAudit);
        assert_eq!(w.retreat(), WizardStage::List);
    }

    #[test]
    fn retreat_from_list_is_a_noop() {
        let mut w = Wizard::new(None);
        assert_eq!(w.retreat(), WizardStage::List);
        assert_eq!(w.stage(), WizardStage::List);
    }

    #[test]
    fn initial_stage_depends_on_reviewing_ballot() {
        let w = Wizard::new(Some(CvrId(12)));
        assert_eq!(w.stage(), WizardStage::BallotAudit);

        let w = Wizard::new(None);
        assert_eq!(w.stage(), WizardStage::List);
    }

    #[test]
    fn resuming_scrolls_to_top() {
        let mut w = Wizard::new(Some(CvrId(12)));
        assert_eq!(w.take_effects(), vec![Effect::ScrollToTop]);
        // Drained.
        assert_eq!(w.take_effects(), vec![]);

        let mut w = Wizard::new(None);
        assert_eq!(w.take_effects(), vec![]);
    }

    #[test]
    fn every_navigation_scrolls_including_noops() {
        let mut w = Wizard::new(None);
        w.retreat(); // no-op
        w.advance();
        w.advance();
        assert_eq!(w.take_effects().len(), 3);
    }

    #[test]
    fn stage_is_closed_under_arbitrary_sequences() {
        // A fixed pseudo-random walk over both directions.
        let mut w = Wizard::new(None);
        let mut x: u32 = 0x2545_f491;
        for _ in 0..1000 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            let stage = if x % 2 == 0 { w.advance() } else { w.retreat() };
            assert!(WizardStage::ALL.contains(&stage));
            assert_eq!(stage, w.stage());
        }
    }

    #[test]
    fn transition_table_matches_documented_pairs() {
        use Direction::*;
        use WizardStage::*;
        assert_eq!(transition(List, Forward), Some(BallotAudit));
        assert_eq!(transition(BallotAudit, Forward), Some(Review));
        assert_eq!(transition(Review, Forward), Some(BallotAudit));
        assert_eq!(transition(BallotAudit, Backward), Some(List));
        assert_eq!(transition(Review, Backward), Some(BallotAudit));
        assert_eq!(transition(List, Backward), None);
    }
}
