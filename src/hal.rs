//! Capabilities the control core consumes from the hardware side.
//!
//! Both traits are infallible: a missing or broken sensor is the
//! implementor's concern, the core only ever sees numbers.

/// Source of raw measurements.
pub trait Acquisition {
    /// Voltage of cell `index` in millivolts.
    fn read_cell_voltage(&mut self, index: usize) -> u16;
    /// Reading of temperature sensor `index` in degrees Celsius.
    fn read_temperature(&mut self, index: usize) -> i8;
    /// Pack current in milliamps, positive while discharging.
    fn read_pack_current(&mut self) -> i32;
}

/// Sink for actuator commands.
pub trait Actuation {
    fn set_balance_switch(&mut self, cell_index: usize, on: bool);
    fn set_charger_enable(&mut self, on: bool);
    fn set_discharge_enable(&mut self, on: bool);
}

impl<T: Acquisition + ?Sized> Acquisition for &mut T {
    fn read_cell_voltage(&mut self, index: usize) -> u16 {
        (**self).read_cell_voltage(index)
    }

    fn read_temperature(&mut self, index: usize) -> i8 {
        (**self).read_temperature(index)
    }

    fn read_pack_current(&mut self) -> i32 {
        (**self).read_pack_current()
    }
}

impl<T: Actuation + ?Sized> Actuation for &mut T {
    fn set_balance_switch(&mut self, cell_index: usize, on: bool) {
        (**self).set_balance_switch(cell_index, on)
    }

    fn set_charger_enable(&mut self, on: bool) {
        (**self).set_charger_enable(on)
    }

    fn set_discharge_enable(&mut self, on: bool) {
        (**self).set_discharge_enable(on)
    }
}
