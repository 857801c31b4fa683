//! Operating mode of the pack.
//!
//! Fault detection overrides every other transition: any nonzero
//! [`FaultMask`] forces [`OperatingState::Fault`] for that cycle, and the
//! machine leaves Fault for Idle only on a cycle whose mask is empty.

use crate::fault::FaultMask;
use crate::limits::{CELL_VOLTAGE_BALANCE, CELL_VOLTAGE_IMBALANCE, CURRENT_HYSTERESIS};
use crate::snapshot::PackSnapshot;
use crate::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum OperatingState {
    #[default]
    Init = 0,
    Idle = 1,
    Charging = 2,
    Discharging = 3,
    Balancing = 4,
    Fault = 5,
}

impl TryFrom<u8> for OperatingState {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(OperatingState::Init),
            1 => Ok(OperatingState::Idle),
            2 => Ok(OperatingState::Charging),
            3 => Ok(OperatingState::Discharging),
            4 => Ok(OperatingState::Balancing),
            5 => Ok(OperatingState::Fault),
            other => Err(Error::UnknownState(other)),
        }
    }
}

impl From<OperatingState> for u8 {
    fn from(state: OperatingState) -> u8 {
        state as u8
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OperatingState::Init => "Init",
            OperatingState::Idle => "Idle",
            OperatingState::Charging => "Charging",
            OperatingState::Discharging => "Discharging",
            OperatingState::Balancing => "Balancing",
            OperatingState::Fault => "Fault",
        };
        f.write_str(name)
    }
}

fn needs_balancing(snapshot: &PackSnapshot) -> bool {
    let range = snapshot.voltage_range();
    range.max > CELL_VOLTAGE_BALANCE && range.spread() > CELL_VOLTAGE_IMBALANCE
}

/// Next state for one cycle.
pub fn transition(
    state: OperatingState,
    faults: FaultMask,
    snapshot: &PackSnapshot,
) -> OperatingState {
    if !faults.is_empty() {
        return OperatingState::Fault;
    }

    let current = snapshot.current;
    match state {
        OperatingState::Init => OperatingState::Idle,
        OperatingState::Idle => {
            if current < -CURRENT_HYSTERESIS {
                OperatingState::Charging
            } else if current > CURRENT_HYSTERESIS {
                OperatingState::Discharging
            } else if needs_balancing(snapshot) {
                OperatingState::Balancing
            } else {
                OperatingState::Idle
            }
        }
        OperatingState::Charging => {
            if current > -CURRENT_HYSTERESIS {
                OperatingState::Idle
            } else {
                OperatingState::Charging
            }
        }
        OperatingState::Discharging => {
            if current < CURRENT_HYSTERESIS {
                OperatingState::Idle
            } else {
                OperatingState::Discharging
            }
        }
        OperatingState::Balancing => {
            if !needs_balancing(snapshot) {
                OperatingState::Idle
            } else if current < -CURRENT_HYSTERESIS {
                OperatingState::Charging
            } else {
                OperatingState::Balancing
            }
        }
        // Only reached with an empty mask.
        OperatingState::Fault => OperatingState::Idle,
    }
}

/// Owner of the current [`OperatingState`].
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: OperatingState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from a stored state code. Codes outside the enumeration put
    /// the machine back to Init.
    pub fn restore(raw: u8) -> Self {
        let state = OperatingState::try_from(raw).unwrap_or_else(|e| {
            log::warn!("{e}, resetting to {}", OperatingState::Init);
            OperatingState::Init
        });
        Self { state }
    }

    pub fn state(&self) -> OperatingState {
        self.state
    }

    pub(crate) fn force(&mut self, state: OperatingState) {
        self.state = state;
    }

    pub fn step(&mut self, faults: FaultMask, snapshot: &PackSnapshot) -> OperatingState {
        let next = transition(self.state, faults, snapshot);
        if next != self.state {
            if next == OperatingState::Fault {
                log::warn!("State {} -> {} ({faults})", self.state, next);
            } else {
                log::info!("State {} -> {}", self.state, next);
            }
            self.state = next;
        }
        next
    }
}
