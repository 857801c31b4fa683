//! Pack geometry and safety thresholds.
//!
//! Everything here is fixed at compile time. Voltages are millivolts,
//! temperatures degrees Celsius and currents milliamps.

/// Number of series cells in the pack.
pub const NUM_CELLS: usize = 12;
/// Number of temperature sensors.
pub const NUM_TEMP_SENSORS: usize = 8;

/// Lowest allowed cell voltage, also the 0% SoC point.
pub const CELL_VOLTAGE_MIN: u16 = 2800;
/// Highest allowed cell voltage, also the 100% SoC point.
pub const CELL_VOLTAGE_MAX: u16 = 4200;
/// Cells above this voltage are candidates for balancing.
pub const CELL_VOLTAGE_BALANCE: u16 = 3900;
/// Largest tolerated spread between the highest and the lowest cell.
pub const CELL_VOLTAGE_IMBALANCE: u16 = 50;

pub const PACK_VOLTAGE_MIN: u32 = CELL_VOLTAGE_MIN as u32 * NUM_CELLS as u32;
pub const PACK_VOLTAGE_MAX: u32 = CELL_VOLTAGE_MAX as u32 * NUM_CELLS as u32;

pub const TEMPERATURE_MIN: i8 = 0;
pub const TEMPERATURE_MAX: i8 = 45;

/// Discharge overcurrent limit (100 A). There is no charge-side counterpart.
pub const CURRENT_MAX: i32 = 100 * 1000;

/// Dead band around zero current. Charging below `-CURRENT_HYSTERESIS`,
/// discharging above `CURRENT_HYSTERESIS`.
pub const CURRENT_HYSTERESIS: i32 = 500;

/// Full capacity of the reference pack (50 Ah).
pub const DEFAULT_CAPACITY_FULL: u32 = 50_000;
