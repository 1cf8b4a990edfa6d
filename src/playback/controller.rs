//! Playback state machine over a [`ScriptStore`].
//!
//! The controller owns the current position and a mirror of memory. Memory
//! always equals the seed table with the writes of steps `1..=position`
//! applied in order. Advancing applies the new step's writes; retreating and
//! jumping rebuild memory from the seed by replaying writes, so no undo
//! history is kept.

use super::highlight::{self, CellHighlight};
use crate::script::{Component, Memory, MemoryCell, ScriptError, ScriptStore, Step};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Mutable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    /// Index of the current step.
    pub position: usize,
    /// Memory mirror at `position`.
    pub memory: Memory,
    /// Set by an advance; cleared by [`PlaybackController::finish_transition`].
    pub transitioning: bool,
}

/// Result of a playback transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Position changed.
    Moved { from: usize, to: usize },
    /// Advance requested at the last step; nothing changed.
    AtEnd,
    /// Retreat requested at the first step; nothing changed.
    AtStart,
    /// Returned to the first step.
    Reset,
}

impl Transition {
    /// Whether the transition changed the position.
    pub fn moved(self) -> bool {
        matches!(self, Transition::Moved { .. })
    }
}

/// Drives playback through a script.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    script: ScriptStore,
    state: PlaybackState,
}

impl PlaybackController {
    /// Start a session at the first step with seed memory.
    pub fn new(script: ScriptStore) -> Self {
        let memory = script.seed().clone();
        Self {
            script,
            state: PlaybackState {
                position: 0,
                memory,
                transitioning: false,
            },
        }
    }

    /// Step forward, applying the new step's memory writes.
    pub fn advance(&mut self) -> Transition {
        if self.is_at_end() {
            debug!(position = self.state.position, "advance ignored at last step");
            return Transition::AtEnd;
        }

        let from = self.state.position;
        let to = from + 1;
        let step = &self.script.steps()[to];
        for update in &step.memory_updates {
            if let Err(e) = self.state.memory.apply(update) {
                unreachable!("write in validated step {to} failed: {e}");
            }
        }
        self.state.position = to;
        self.state.transitioning = true;

        debug!(from, to, phase = %step.phase, writes = step.memory_updates.len(), "advanced");
        Transition::Moved { from, to }
    }

    /// Step back, rebuilding memory from the seed.
    pub fn retreat(&mut self) -> Transition {
        if self.is_at_start() {
            debug!("retreat ignored at first step");
            return Transition::AtStart;
        }

        let from = self.state.position;
        let to = from - 1;
        self.rebuild(to);

        debug!(from, to, "retreated");
        Transition::Moved { from, to }
    }

    /// Return to the first step with seed memory.
    pub fn reset(&mut self) -> Transition {
        self.state.position = 0;
        self.state.memory = self.script.seed().clone();
        self.state.transitioning = false;

        debug!("reset");
        Transition::Reset
    }

    /// Move straight to `position`, rebuilding memory from the seed.
    pub fn jump_to(&mut self, position: usize) -> Result<Transition, ScriptError> {
        self.script.step_at(position)?;

        let from = self.state.position;
        self.rebuild(position);
        self.state.transitioning = position > from;

        debug!(from, to = position, "jumped");
        Ok(Transition::Moved { from, to: position })
    }

    /// Clear the transition flag once the view's highlight has decayed.
    pub fn finish_transition(&mut self) {
        self.state.transitioning = false;
    }

    fn rebuild(&mut self, position: usize) {
        self.state.memory = match self.script.memory_at(position) {
            Ok(memory) => memory,
            Err(e) => unreachable!("replay of validated script failed: {e}"),
        };
        self.state.position = position;
        self.state.transitioning = false;
    }

    // ==================== Queries ====================

    /// Current session state.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// The script being played.
    pub fn script(&self) -> &ScriptStore {
        &self.script
    }

    pub fn position(&self) -> usize {
        self.state.position
    }

    /// Number of steps in the script.
    pub fn len(&self) -> usize {
        self.script.len()
    }

    /// Always false: a validated script has at least one step.
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn is_at_start(&self) -> bool {
        self.state.position == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.state.position + 1 >= self.script.len()
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.transitioning
    }

    /// The step at the current position.
    pub fn current_step(&self) -> &Step {
        &self.script.steps()[self.state.position]
    }

    /// Components highlighted by the current step.
    pub fn active_set(&self) -> &BTreeSet<Component> {
        &self.current_step().active_components
    }

    pub fn is_active(&self, component: Component) -> bool {
        self.current_step().is_active(component)
    }

    /// Memory cells in address order.
    pub fn memory_snapshot(&self) -> Vec<MemoryCell> {
        self.state.memory.snapshot()
    }

    /// Whether the current step's bus transfer or writes target `cell`.
    pub fn is_bus_targeting(&self, cell: &MemoryCell) -> bool {
        highlight::is_bus_targeting(self.current_step(), cell)
    }

    /// How the current step involves `cell`.
    pub fn cell_highlight(&self, cell: &MemoryCell) -> CellHighlight {
        highlight::cell_highlight(self.current_step(), cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller() -> PlaybackController {
        PlaybackController::new(ScriptStore::builtin().unwrap())
    }

    fn content(ctl: &PlaybackController, address: u32) -> String {
        ctl.state().memory.get(address).unwrap().content.clone()
    }

    fn advance_n(ctl: &mut PlaybackController, n: usize) {
        for _ in 0..n {
            ctl.advance();
        }
    }

    #[test]
    fn test_initial_state() {
        let ctl = controller();
        let regs = &ctl.current_step().registers;

        assert_eq!(ctl.position(), 0);
        assert_eq!(regs.pc, Some(0));
        assert_eq!(regs.acc, Some(0));
        assert_eq!(regs.ir.as_deref(), Some(""));
        assert!(!ctl.is_transitioning());
        assert_eq!(&ctl.state().memory, ctl.script().seed());
    }

    #[test]
    fn test_load_add_store_scenario() {
        let mut ctl = controller();

        advance_n(&mut ctl, 6);
        assert_eq!(ctl.current_step().registers.acc, Some(3));

        advance_n(&mut ctl, 7);
        assert_eq!(ctl.position(), 13);
        assert_eq!(ctl.current_step().registers.acc, Some(8));
        assert_eq!(content(&ctl, 12), "0");

        advance_n(&mut ctl, 5);
        assert_eq!(ctl.position(), 18);
        assert_eq!(content(&ctl, 12), "8");

        while ctl.advance().moved() {
            assert_eq!(content(&ctl, 12), "8");
        }
        assert!(ctl.is_at_end());
        assert_eq!(content(&ctl, 12), "8");
    }

    #[test]
    fn test_advance_at_end_is_noop() {
        let mut ctl = controller();
        let last = ctl.len() - 1;
        advance_n(&mut ctl, last);
        let before = ctl.state().clone();

        assert_eq!(ctl.advance(), Transition::AtEnd);
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn test_retreat_at_start_is_noop() {
        let mut ctl = controller();
        let before = ctl.state().clone();

        assert_eq!(ctl.retreat(), Transition::AtStart);
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn test_retreat_undoes_store() {
        let mut ctl = controller();
        advance_n(&mut ctl, 18);
        assert_eq!(content(&ctl, 12), "8");

        assert_eq!(ctl.retreat(), Transition::Moved { from: 18, to: 17 });
        assert_eq!(content(&ctl, 12), "0");
    }

    #[test]
    fn test_transitioning_flag() {
        let mut ctl = controller();

        ctl.advance();
        assert!(ctl.is_transitioning());

        ctl.finish_transition();
        assert!(!ctl.is_transitioning());

        ctl.advance();
        ctl.reset();
        assert!(!ctl.is_transitioning());
    }

    #[test]
    fn test_jump_to() {
        let mut ctl = controller();

        assert_eq!(ctl.jump_to(20), Ok(Transition::Moved { from: 0, to: 20 }));
        assert_eq!(content(&ctl, 12), "8");

        ctl.jump_to(5).unwrap();
        assert_eq!(content(&ctl, 12), "0");

        let len = ctl.len();
        assert_eq!(ctl.jump_to(len), Err(ScriptError::OutOfRange { index: len, len }));
        assert_eq!(ctl.position(), 5);
    }

    #[test]
    fn test_highlight_follows_current_step() {
        let mut ctl = controller();
        advance_n(&mut ctl, 1); // PC -> memory, address 0

        let cells = ctl.memory_snapshot();
        let targeted: Vec<_> = cells
            .iter()
            .filter(|c| ctl.is_bus_targeting(c))
            .map(|c| c.address)
            .collect();
        assert_eq!(targeted, vec![0]);
        assert!(ctl.is_active(Component::AddressBus));
        assert!(!ctl.is_active(Component::Alu));

        advance_n(&mut ctl, 17); // STORE write
        let cell = ctl.state().memory.get(12).unwrap().clone();
        assert_eq!(ctl.cell_highlight(&cell), CellHighlight::Write);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Advance,
        Retreat,
        Reset,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => Just(Op::Advance),
            3 => Just(Op::Retreat),
            1 => Just(Op::Reset),
        ]
    }

    fn run(ctl: &mut PlaybackController, op: Op) {
        match op {
            Op::Advance => { ctl.advance(); }
            Op::Retreat => { ctl.retreat(); }
            Op::Reset => { ctl.reset(); }
        }
    }

    proptest! {
        #[test]
        fn prop_memory_matches_replay(ops in prop::collection::vec(op(), 0..80)) {
            let mut ctl = controller();
            for op in ops {
                run(&mut ctl, op);
                prop_assert!(ctl.position() < ctl.len());
                let expected = ctl.script().memory_at(ctl.position()).unwrap();
                prop_assert_eq!(&ctl.state().memory, &expected);
            }
        }

        #[test]
        fn prop_reset_restores_seed(ops in prop::collection::vec(op(), 0..60)) {
            let mut ctl = controller();
            for op in ops {
                run(&mut ctl, op);
            }
            ctl.reset();
            prop_assert_eq!(ctl.position(), 0);
            prop_assert_eq!(&ctl.state().memory, ctl.script().seed());
            prop_assert!(!ctl.is_transitioning());
        }

        #[test]
        fn prop_advance_retreat_roundtrip(start in 0usize..23) {
            let mut ctl = controller();
            ctl.jump_to(start).unwrap();
            let memory = ctl.state().memory.clone();

            prop_assert!(ctl.advance().moved());
            prop_assert!(ctl.retreat().moved());
            prop_assert_eq!(ctl.position(), start);
            prop_assert_eq!(&ctl.state().memory, &memory);
        }
    }
}
