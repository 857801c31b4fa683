use crate::hal::Acquisition;
use crate::limits::{NUM_CELLS, NUM_TEMP_SENSORS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Latest readings of the whole pack.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackSnapshot {
    /// Millivolts, indexed by cell.
    pub cell_voltages: [u16; NUM_CELLS],
    /// Degrees Celsius, indexed by sensor.
    pub temperatures: [i8; NUM_TEMP_SENSORS],
    pub current: i32, // negative=charging, positive=discharging
}

impl Default for PackSnapshot {
    fn default() -> Self {
        Self {
            cell_voltages: [0; NUM_CELLS],
            temperatures: [0; NUM_TEMP_SENSORS],
            current: 0,
        }
    }
}

/// Lowest and highest cell voltage of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoltageRange {
    pub min: u16,
    pub max: u16,
}

impl VoltageRange {
    pub fn spread(&self) -> u16 {
        self.max - self.min
    }
}

impl PackSnapshot {
    pub fn new(
        cell_voltages: [u16; NUM_CELLS],
        temperatures: [i8; NUM_TEMP_SENSORS],
        current: i32,
    ) -> Self {
        Self {
            cell_voltages,
            temperatures,
            current,
        }
    }

    /// Overwrites every reading with a fresh one from `source`, one call per
    /// cell and per sensor.
    pub fn refresh<A: Acquisition>(&mut self, source: &mut A) {
        for (index, voltage) in self.cell_voltages.iter_mut().enumerate() {
            *voltage = source.read_cell_voltage(index);
        }
        for (index, temperature) in self.temperatures.iter_mut().enumerate() {
            *temperature = source.read_temperature(index);
        }
        self.current = source.read_pack_current();
        log::trace!(
            "Snapshot refreshed - cells={:?} temperatures={:?} current={}mA",
            self.cell_voltages,
            self.temperatures,
            self.current
        );
    }

    /// Min and max cell voltage. Every stage that needs them goes through
    /// here so the decisions always agree.
    pub fn voltage_range(&self) -> VoltageRange {
        self.cell_voltages.iter().fold(
            VoltageRange {
                min: u16::MAX,
                max: 0,
            },
            |range, &voltage| VoltageRange {
                min: range.min.min(voltage),
                max: range.max.max(voltage),
            },
        )
    }

    /// Sum of all cell voltages in millivolts.
    pub fn pack_voltage(&self) -> u32 {
        self.cell_voltages.iter().map(|&v| u32::from(v)).sum()
    }

    /// Truncating mean cell voltage.
    pub fn average_cell_voltage(&self) -> u32 {
        self.pack_voltage() / NUM_CELLS as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        cell_reads: usize,
        temperature_reads: usize,
        current_reads: usize,
    }

    impl Acquisition for Counting {
        fn read_cell_voltage(&mut self, index: usize) -> u16 {
            self.cell_reads += 1;
            3600 + index as u16
        }

        fn read_temperature(&mut self, index: usize) -> i8 {
            self.temperature_reads += 1;
            20 + index as i8
        }

        fn read_pack_current(&mut self) -> i32 {
            self.current_reads += 1;
            -1200
        }
    }

    #[test]
    fn refresh_reads_each_channel_once() {
        let mut source = Counting {
            cell_reads: 0,
            temperature_reads: 0,
            current_reads: 0,
        };
        let mut snapshot = PackSnapshot::default();
        snapshot.refresh(&mut source);

        assert_eq!(source.cell_reads, NUM_CELLS);
        assert_eq!(source.temperature_reads, NUM_TEMP_SENSORS);
        assert_eq!(source.current_reads, 1);
        assert_eq!(snapshot.cell_voltages[0], 3600);
        assert_eq!(snapshot.cell_voltages[11], 3611);
        assert_eq!(snapshot.temperatures[7], 27);
        assert_eq!(snapshot.current, -1200);
    }

    #[test]
    fn voltage_range_and_sums() {
        let mut cells = [3700; NUM_CELLS];
        cells[3] = 3650;
        cells[9] = 3790;
        let snapshot = PackSnapshot::new(cells, [25; NUM_TEMP_SENSORS], 0);

        let range = snapshot.voltage_range();
        assert_eq!(range, VoltageRange { min: 3650, max: 3790 });
        assert_eq!(range.spread(), 140);
        assert_eq!(snapshot.pack_voltage(), 3700 * 10 + 3650 + 3790);
        // 44440 / 12 = 3703.33
        assert_eq!(snapshot.average_cell_voltage(), 3703);
    }
}
