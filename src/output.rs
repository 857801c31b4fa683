use crate::hal::Actuation;
use crate::state::OperatingState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Charger and discharge enables for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputCommand {
    pub charger_enable: bool,
    pub discharge_enable: bool,
}

impl OutputCommand {
    /// Charger and discharge both disabled.
    pub const SAFE: Self = Self {
        charger_enable: false,
        discharge_enable: false,
    };

    pub fn for_state(state: OperatingState) -> Self {
        let (charger_enable, discharge_enable) = match state {
            OperatingState::Init | OperatingState::Fault => (false, false),
            OperatingState::Idle | OperatingState::Balancing => (true, true),
            OperatingState::Charging => (true, false),
            OperatingState::Discharging => (false, true),
        };
        Self {
            charger_enable,
            discharge_enable,
        }
    }

    /// Like [`OutputCommand::for_state`] for a raw state code. Unknown codes
    /// map to [`OutputCommand::SAFE`].
    pub fn for_raw_state(raw: u8) -> Self {
        OperatingState::try_from(raw)
            .map(Self::for_state)
            .unwrap_or(Self::SAFE)
    }

    /// Writes both enables. Called every cycle, unconditionally.
    pub fn apply<U: Actuation>(&self, actuators: &mut U) {
        actuators.set_charger_enable(self.charger_enable);
        actuators.set_discharge_enable(self.discharge_enable);
    }
}
