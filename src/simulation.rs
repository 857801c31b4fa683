//! Stand-ins for the acquisition and actuation hardware.
//!
//! [`RandomPack`] produces noisy readings around a nominal 3.7 V pack,
//! [`Scenario`] replays a scripted sequence of readings loaded from YAML and
//! [`LoggingActuators`] turns actuator writes into log lines.

use crate::hal::{Acquisition, Actuation};
use crate::limits::{DEFAULT_CAPACITY_FULL, NUM_CELLS, NUM_TEMP_SENSORS};
use crate::snapshot::PackSnapshot;
use crate::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::time::Duration;

const BASE_CELL_VOLTAGE: u16 = 3700;
const BASE_TEMPERATURE: i8 = 25;

/// Random readings around 3.7 V and 25 °C with a current that occasionally
/// flips between charging and discharging.
#[derive(Debug)]
pub struct RandomPack {
    rng: StdRng,
    is_charging: bool,
}

impl RandomPack {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            is_charging: false,
        }
    }
}

impl Default for RandomPack {
    fn default() -> Self {
        Self::new()
    }
}

impl Acquisition for RandomPack {
    fn read_cell_voltage(&mut self, index: usize) -> u16 {
        let variation: u16 = self.rng.gen_range(0..50);
        // three groups of cells sitting at slightly different levels
        match index % 3 {
            0 => BASE_CELL_VOLTAGE - 20 + variation,
            1 => BASE_CELL_VOLTAGE + variation,
            _ => BASE_CELL_VOLTAGE + 30 + variation,
        }
    }

    fn read_temperature(&mut self, index: usize) -> i8 {
        let variation: i8 = self.rng.gen_range(0..5);
        if index < NUM_TEMP_SENSORS / 2 {
            BASE_TEMPERATURE + variation
        } else {
            BASE_TEMPERATURE + 2 + variation
        }
    }

    fn read_pack_current(&mut self) -> i32 {
        if self.rng.gen_range(0..100u32) == 0 {
            self.is_charging = !self.is_charging;
            log::debug!(
                "Simulated load switched to {}",
                if self.is_charging { "charging" } else { "discharging" }
            );
        }
        if self.is_charging {
            -(5000 + self.rng.gen_range(0..15000))
        } else {
            2000 + self.rng.gen_range(0..30000)
        }
    }
}

/// A recorded snapshot replays its own readings.
impl Acquisition for PackSnapshot {
    fn read_cell_voltage(&mut self, index: usize) -> u16 {
        self.cell_voltages[index]
    }

    fn read_temperature(&mut self, index: usize) -> i8 {
        self.temperatures[index]
    }

    fn read_pack_current(&mut self) -> i32 {
        self.current
    }
}

/// Actuators that only log, remembering what they were last told.
#[derive(Debug, Clone, Default)]
pub struct LoggingActuators {
    pub balance_switches: [bool; NUM_CELLS],
    pub charger_enable: Option<bool>,
    pub discharge_enable: Option<bool>,
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

impl Actuation for LoggingActuators {
    fn set_balance_switch(&mut self, cell_index: usize, on: bool) {
        log::info!("Cell #{} balancing: {}", cell_index, on_off(on));
        self.balance_switches[cell_index] = on;
    }

    fn set_charger_enable(&mut self, on: bool) {
        log::debug!("Charger: {}", on_off(on));
        self.charger_enable = Some(on);
    }

    fn set_discharge_enable(&mut self, on: bool) {
        log::debug!("Discharge: {}", on_off(on));
        self.discharge_enable = Some(on);
    }
}

/// One scripted set of readings, held for `repeat` cycles.
///
/// `cells` and `temperatures` take either one value per channel or a single
/// value that is used for every channel.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioStep {
    pub cells: Vec<u16>,
    #[serde(default = "ScenarioStep::default_temperatures")]
    pub temperatures: Vec<i8>,
    #[serde(default)]
    pub current: i32,
    #[serde(default = "ScenarioStep::default_repeat")]
    pub repeat: usize,
}

impl ScenarioStep {
    fn default_temperatures() -> Vec<i8> {
        vec![BASE_TEMPERATURE]
    }

    fn default_repeat() -> usize {
        1
    }
}

fn expand<T: Copy + Default, const N: usize>(
    values: &[T],
    step: usize,
    what: &'static str,
) -> Result<[T; N], Error> {
    match values.len() {
        1 => Ok([values[0]; N]),
        len if len == N => {
            let mut out = [T::default(); N];
            out.copy_from_slice(values);
            Ok(out)
        }
        actual => Err(Error::ScenarioShape {
            step,
            what,
            expected: N,
            actual,
        }),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    #[serde(default = "Scenario::default_capacity_full")]
    pub capacity_full: u32,
    /// Stored state code to resume from instead of Init.
    #[serde(default)]
    pub initial_state: Option<u8>,
    /// Run the start-up sequence before the first cycle.
    #[serde(default)]
    pub initialize: bool,
    /// Overrides the driver's cycle interval.
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    fn default_capacity_full() -> u32 {
        DEFAULT_CAPACITY_FULL
    }

    pub fn load(path: &str) -> Result<Self, Error> {
        log::debug!("Loading scenario from {path:?}");
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// One snapshot per cycle, with every step expanded by its repeat count.
    pub fn frames(&self) -> Result<Vec<PackSnapshot>, Error> {
        let mut frames = Vec::new();
        for (n, step) in self.steps.iter().enumerate() {
            let snapshot = PackSnapshot::new(
                expand::<u16, NUM_CELLS>(&step.cells, n, "cell voltages")?,
                expand::<i8, NUM_TEMP_SENSORS>(&step.temperatures, n, "temperatures")?,
                step.current,
            );
            frames.extend(std::iter::repeat(snapshot).take(step.repeat));
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_pack_stays_in_band() {
        let mut pack = RandomPack::with_seed(7);
        for _ in 0..500 {
            for cell in 0..NUM_CELLS {
                let voltage = pack.read_cell_voltage(cell);
                assert!((3680..3780).contains(&voltage), "cell {cell}: {voltage}");
            }
            for sensor in 0..NUM_TEMP_SENSORS {
                let temperature = pack.read_temperature(sensor);
                assert!((25..32).contains(&temperature), "sensor {sensor}: {temperature}");
            }
            let current = pack.read_pack_current();
            assert!(
                (-20_000..=-5000).contains(&current) || (2000..32_000).contains(&current),
                "current {current}"
            );
        }
    }

    #[test]
    fn seeded_packs_repeat() {
        let mut a = RandomPack::with_seed(42);
        let mut b = RandomPack::with_seed(42);
        for _ in 0..50 {
            assert_eq!(a.read_pack_current(), b.read_pack_current());
            assert_eq!(a.read_cell_voltage(4), b.read_cell_voltage(4));
        }
    }

    #[test]
    fn scenario_from_yaml() {
        let yaml = r#"
initialize: true
interval: 250ms
steps:
  - cells: [3700]
  - cells: [4000, 4000, 4000, 4000, 3850, 4000, 4000, 4000, 4000, 4000, 4000, 4000]
    temperatures: [20, 21, 22, 23, 24, 25, 26, 27]
    current: -600
    repeat: 3
"#;
        let scenario = Scenario::from_reader(yaml.as_bytes()).unwrap();
        assert!(scenario.initialize);
        assert_eq!(scenario.initial_state, None);
        assert_eq!(scenario.capacity_full, DEFAULT_CAPACITY_FULL);
        assert_eq!(scenario.interval, Some(Duration::from_millis(250)));

        let frames = scenario.frames().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].cell_voltages, [3700; NUM_CELLS]);
        assert_eq!(frames[0].temperatures, [25; NUM_TEMP_SENSORS]);
        assert_eq!(frames[0].current, 0);
        assert_eq!(frames[3].cell_voltages[4], 3850);
        assert_eq!(frames[3].temperatures[7], 27);
        assert_eq!(frames[3].current, -600);
    }

    #[test]
    fn scenario_rejects_wrong_channel_count() {
        let yaml = "steps:\n  - cells: [3700, 3700]\n";
        let scenario = Scenario::from_reader(yaml.as_bytes()).unwrap();
        assert!(matches!(
            scenario.frames(),
            Err(Error::ScenarioShape {
                step: 0,
                expected: NUM_CELLS,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn bundled_scenario_runs() {
        use crate::{Bms, OperatingState};

        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/scenarios/charge_fault_recover.yaml"
        );
        let scenario = Scenario::load(path).unwrap();
        let frames = scenario.frames().unwrap();
        assert_eq!(frames.len(), 15);

        let mut bms = Bms::new(scenario.capacity_full);
        let mut actuators = LoggingActuators::default();
        let states: Vec<OperatingState> = frames
            .into_iter()
            .map(|mut frame| bms.cycle(&mut frame, &mut actuators).state)
            .collect();

        use OperatingState::*;
        assert_eq!(
            states,
            vec![
                Idle, Idle, Charging, Charging, Charging, Charging, Charging, Fault, Fault, Fault,
                Idle, Idle, Idle, Discharging, Discharging
            ]
        );
        assert_eq!(actuators.balance_switches, [false; NUM_CELLS]);
        assert_eq!(actuators.charger_enable, Some(false));
        assert_eq!(actuators.discharge_enable, Some(true));
    }

    #[test]
    fn snapshot_replays_itself() {
        let mut snapshot = PackSnapshot::new([3650; NUM_CELLS], [-3; NUM_TEMP_SENSORS], 1234);
        assert_eq!(snapshot.read_cell_voltage(11), 3650);
        assert_eq!(snapshot.read_temperature(0), -3);
        assert_eq!(snapshot.read_pack_current(), 1234);
    }

    #[test]
    fn logging_actuators_remember_last_command() {
        let mut actuators = LoggingActuators::default();
        actuators.set_balance_switch(3, true);
        actuators.set_charger_enable(false);
        assert!(actuators.balance_switches[3]);
        assert_eq!(actuators.charger_enable, Some(false));
        assert_eq!(actuators.discharge_enable, None);
    }
}
