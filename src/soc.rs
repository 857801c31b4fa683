//! Voltage based state of charge.
//!
//! The estimate is a straight line between [`CELL_VOLTAGE_MIN`] and
//! [`CELL_VOLTAGE_MAX`] applied to the mean cell voltage. No coulomb counting
//! and no temperature compensation.

use crate::limits::{CELL_VOLTAGE_MAX, CELL_VOLTAGE_MIN, DEFAULT_CAPACITY_FULL};
use crate::snapshot::PackSnapshot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChargeState {
    /// Percent, 0..=100.
    pub soc: u8,
    /// mAh
    pub capacity_remaining: u32,
    /// mAh
    pub capacity_full: u32,
}

impl Default for ChargeState {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_FULL)
    }
}

/// Maps a mean cell voltage onto 0..=100 percent.
pub fn soc_from_voltage(average: u32) -> u8 {
    let min = u32::from(CELL_VOLTAGE_MIN);
    let max = u32::from(CELL_VOLTAGE_MAX);
    if average <= min {
        0
    } else if average >= max {
        100
    } else {
        ((average - min) * 100 / (max - min)) as u8
    }
}

impl ChargeState {
    pub fn new(capacity_full: u32) -> Self {
        Self {
            soc: 0,
            capacity_remaining: 0,
            capacity_full,
        }
    }

    pub fn update(&mut self, snapshot: &PackSnapshot) {
        self.soc = soc_from_voltage(snapshot.average_cell_voltage());
        self.capacity_remaining =
            (u64::from(self.capacity_full) * u64::from(self.soc) / 100) as u32;
        log::debug!(
            "SoC {}% ({}/{} mAh)",
            self.soc,
            self.capacity_remaining,
            self.capacity_full
        );
    }
}
