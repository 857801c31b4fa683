use crate::limits::{
    CELL_VOLTAGE_IMBALANCE, CELL_VOLTAGE_MAX, CELL_VOLTAGE_MIN, CURRENT_MAX, PACK_VOLTAGE_MAX,
    PACK_VOLTAGE_MIN, TEMPERATURE_MAX, TEMPERATURE_MIN,
};
use crate::snapshot::PackSnapshot;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Safety envelopes violated by the current snapshot. Empty means healthy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FaultMask: u8 {
        const CELL_UNDERVOLTAGE = 0x01;
        const CELL_OVERVOLTAGE = 0x02;
        const PACK_UNDERVOLTAGE = 0x04;
        const PACK_OVERVOLTAGE = 0x08;
        const OVER_TEMPERATURE = 0x10;
        const UNDER_TEMPERATURE = 0x20;
        /// Discharge direction only.
        const OVERCURRENT = 0x40;
        const CELL_IMBALANCE = 0x80;
    }
}

impl FaultMask {
    /// Evaluates every envelope against `snapshot` from scratch. Nothing is
    /// carried over from earlier calls.
    pub fn classify(snapshot: &PackSnapshot) -> Self {
        let mut faults = FaultMask::empty();

        for &voltage in &snapshot.cell_voltages {
            if voltage < CELL_VOLTAGE_MIN {
                faults |= FaultMask::CELL_UNDERVOLTAGE;
            }
            if voltage > CELL_VOLTAGE_MAX {
                faults |= FaultMask::CELL_OVERVOLTAGE;
            }
        }

        if snapshot.voltage_range().spread() > CELL_VOLTAGE_IMBALANCE {
            faults |= FaultMask::CELL_IMBALANCE;
        }

        let pack_voltage = snapshot.pack_voltage();
        if pack_voltage < PACK_VOLTAGE_MIN {
            faults |= FaultMask::PACK_UNDERVOLTAGE;
        }
        if pack_voltage > PACK_VOLTAGE_MAX {
            faults |= FaultMask::PACK_OVERVOLTAGE;
        }

        for &temperature in &snapshot.temperatures {
            if temperature < TEMPERATURE_MIN {
                faults |= FaultMask::UNDER_TEMPERATURE;
            }
            if temperature > TEMPERATURE_MAX {
                faults |= FaultMask::OVER_TEMPERATURE;
            }
        }

        if snapshot.current > CURRENT_MAX {
            faults |= FaultMask::OVERCURRENT;
        }

        faults
    }

    /// Human readable text for a single fault bit.
    pub fn description(&self) -> &'static str {
        const DESCRIPTIONS: [(FaultMask, &str); 8] = [
            (FaultMask::CELL_UNDERVOLTAGE, "Cell voltage is too low"),
            (FaultMask::CELL_OVERVOLTAGE, "Cell voltage is too high"),
            (FaultMask::PACK_UNDERVOLTAGE, "Total voltage is too low"),
            (FaultMask::PACK_OVERVOLTAGE, "Total voltage is too high"),
            (FaultMask::OVER_TEMPERATURE, "Temperature is too high"),
            (FaultMask::UNDER_TEMPERATURE, "Temperature is too low"),
            (FaultMask::OVERCURRENT, "Discharge over current"),
            (FaultMask::CELL_IMBALANCE, "Excessive cell voltage difference"),
        ];
        DESCRIPTIONS
            .iter()
            .find(|(flag, _)| flag == self)
            .map(|(_, text)| *text)
            .unwrap_or(if self.is_empty() {
                "No fault"
            } else {
                "Multiple faults"
            })
    }
}

impl fmt::Display for FaultMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        for (n, (name, _)) in self.iter_names().enumerate() {
            if n > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}
