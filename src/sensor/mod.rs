use crate::error::Error;

pub mod ds18b20;
pub mod ina219;

/// Which of the two soil probes to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Probe {
    First,
    Second,
}

/// 64 bit ROM code of a device on the one-wire bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OneWireAddress(pub u64);

pub const MAX_ONEWIRE_DEVICES: usize = 4;

pub type Devices = heapless::Vec<OneWireAddress, MAX_ONEWIRE_DEVICES>;

/// Capacitive soil probes fed from switchable GPIO rails.
///
/// Probes must be powered down after probing, a constantly powered probe
/// corrodes and drains roughly 10 mA each during the long sleep.
pub trait MoistureSensor {
    /// Enable the probe power rails
    async fn on(&mut self) -> Result<(), Error>;

    /// Disable the probe power rails
    async fn off(&mut self) -> Result<(), Error>;

    /// Raw 12 bit ADC reading of one probe
    async fn read(&mut self, probe: Probe) -> Result<u16, Error>;
}

/// Temperature probes sharing a one-wire bus.
pub trait TemperatureBus {
    async fn discover(&mut self) -> Result<Devices, Error>;

    /// Start a conversion on every device at once, the caller waits for it to settle
    async fn convert(&mut self) -> Result<(), Error>;

    async fn read(&mut self, device: &OneWireAddress) -> Result<f32, Error>;
}

/// Supply voltage and current monitor with a low power mode.
pub trait PowerMonitor {
    /// Bus voltage in volts
    async fn voltage(&mut self) -> Result<f32, Error>;

    /// Load current in milliamps
    async fn current(&mut self) -> Result<f32, Error>;

    async fn sleep(&mut self) -> Result<(), Error>;

    /// Leave low power mode, returns once a fresh measurement is available
    async fn wake(&mut self) -> Result<(), Error>;
}
