use crate::hal::Actuation;
use crate::limits::{CELL_VOLTAGE_BALANCE, CELL_VOLTAGE_IMBALANCE, NUM_CELLS};
use crate::snapshot::PackSnapshot;
use crate::state::OperatingState;

/// Chooses which cells to bleed and drives their balance switches.
///
/// Switch commands are edge triggered: a cell's switch is only written when
/// its desired state differs from the last commanded one.
#[derive(Debug, Clone, Default)]
pub struct BalancingSelector {
    balancing_active: [bool; NUM_CELLS],
}

impl BalancingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded switch state per cell.
    pub fn balancing_active(&self) -> &[bool; NUM_CELLS] {
        &self.balancing_active
    }

    pub fn any_active(&self) -> bool {
        self.balancing_active.iter().any(|&on| on)
    }

    /// Cells that should be bled for `snapshot` while `state` holds.
    pub fn desired(snapshot: &PackSnapshot, state: OperatingState) -> [bool; NUM_CELLS] {
        let mut desired = [false; NUM_CELLS];
        if !matches!(
            state,
            OperatingState::Charging | OperatingState::Balancing
        ) {
            return desired;
        }

        let max_voltage = snapshot.voltage_range().max;
        if max_voltage < CELL_VOLTAGE_BALANCE {
            return desired;
        }

        let floor = max_voltage.saturating_sub(CELL_VOLTAGE_IMBALANCE);
        for (want, &voltage) in desired.iter_mut().zip(&snapshot.cell_voltages) {
            *want = voltage > CELL_VOLTAGE_BALANCE && voltage > floor;
        }
        desired
    }

    pub fn update<U: Actuation>(
        &mut self,
        snapshot: &PackSnapshot,
        state: OperatingState,
        actuators: &mut U,
    ) {
        let desired = Self::desired(snapshot, state);
        for (cell, (active, want)) in self.balancing_active.iter_mut().zip(desired).enumerate() {
            if *active != want {
                log::info!(
                    "Cell #{} balancing {} ({}mV)",
                    cell,
                    if want { "on" } else { "off" },
                    snapshot.cell_voltages[cell]
                );
                *active = want;
                actuators.set_balance_switch(cell, want);
            }
        }
    }
}
