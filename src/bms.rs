use crate::balancing::BalancingSelector;
use crate::fault::FaultMask;
use crate::hal::{Acquisition, Actuation};
use crate::limits::{DEFAULT_CAPACITY_FULL, NUM_CELLS};
use crate::output::OutputCommand;
use crate::snapshot::PackSnapshot;
use crate::soc::ChargeState;
use crate::state::{OperatingState, StateMachine};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What one control cycle produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleReport {
    pub cycle: u64,
    pub state: OperatingState,
    pub soc: u8,
    pub capacity_remaining: u32,
    pub fault_mask: u8,
    pub current: i32,
    pub balancing: [bool; NUM_CELLS],
    pub outputs: OutputCommand,
}

impl CycleReport {
    pub fn faults(&self) -> FaultMask {
        FaultMask::from_bits_truncate(self.fault_mask)
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BMS State: {}, SoC: {}%, Fault Code: 0x{:02X}",
            self.state, self.soc, self.fault_mask
        )
    }
}

/// The control core of one pack.
///
/// Owns every stage's output and runs them in order once per [`Bms::cycle`]:
/// snapshot refresh, SoC, fault classification, state transition, balancing
/// and output mapping.
#[derive(Debug, Clone)]
pub struct Bms {
    snapshot: PackSnapshot,
    charge: ChargeState,
    faults: FaultMask,
    machine: StateMachine,
    balancing: BalancingSelector,
    outputs: OutputCommand,
    cycles: u64,
}

impl Default for Bms {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_FULL)
    }
}

impl Bms {
    pub fn new(capacity_full: u32) -> Self {
        Self {
            snapshot: PackSnapshot::default(),
            charge: ChargeState::new(capacity_full),
            faults: FaultMask::empty(),
            machine: StateMachine::new(),
            balancing: BalancingSelector::new(),
            outputs: OutputCommand::SAFE,
            cycles: 0,
        }
    }

    /// Resumes from a stored state code, see [`StateMachine::restore`].
    pub fn restore(capacity_full: u32, raw_state: u8) -> Self {
        Self {
            machine: StateMachine::restore(raw_state),
            ..Self::new(capacity_full)
        }
    }

    /// Start-up sequence: take a first set of readings and go straight to
    /// Idle, or to Fault if those readings already violate an envelope.
    pub fn initialize<A: Acquisition>(&mut self, acquisition: &mut A) {
        self.snapshot.refresh(acquisition);
        self.charge.update(&self.snapshot);
        self.faults = FaultMask::classify(&self.snapshot);
        let state = if self.faults.is_empty() {
            OperatingState::Idle
        } else {
            log::warn!("Faults at start-up: {}", self.faults);
            OperatingState::Fault
        };
        log::info!("Initialized - state={} soc={}%", state, self.charge.soc);
        self.machine.force(state);
    }

    pub fn cycle<A: Acquisition, U: Actuation>(
        &mut self,
        acquisition: &mut A,
        actuators: &mut U,
    ) -> CycleReport {
        self.snapshot.refresh(acquisition);
        self.charge.update(&self.snapshot);

        let faults = FaultMask::classify(&self.snapshot);
        let raised = faults - self.faults;
        if !raised.is_empty() {
            log::warn!("Faults raised: {raised}");
        }
        let cleared = self.faults - faults;
        if !cleared.is_empty() {
            log::info!("Faults cleared: {cleared}");
        }
        self.faults = faults;
        log::debug!("Fault mask 0x{:02X}", faults.bits());

        let state = self.machine.step(self.faults, &self.snapshot);
        self.balancing.update(&self.snapshot, state, actuators);

        self.outputs = OutputCommand::for_state(state);
        self.outputs.apply(actuators);

        self.cycles += 1;
        self.report()
    }

    pub fn report(&self) -> CycleReport {
        CycleReport {
            cycle: self.cycles,
            state: self.machine.state(),
            soc: self.charge.soc,
            capacity_remaining: self.charge.capacity_remaining,
            fault_mask: self.faults.bits(),
            current: self.snapshot.current,
            balancing: *self.balancing.balancing_active(),
            outputs: self.outputs,
        }
    }

    pub fn snapshot(&self) -> &PackSnapshot {
        &self.snapshot
    }

    pub fn charge(&self) -> &ChargeState {
        &self.charge
    }

    pub fn faults(&self) -> FaultMask {
        self.faults
    }

    pub fn state(&self) -> OperatingState {
        self.machine.state()
    }

    pub fn balancing_active(&self) -> &[bool; NUM_CELLS] {
        self.balancing.balancing_active()
    }

    pub fn outputs(&self) -> OutputCommand {
        self.outputs
    }
}
