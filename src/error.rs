#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    FailedToInitialize,
    InvalidPodId,
    InvalidReadingCount,
    AdcFailed,
    I2CBusReadFailed,
    I2CBusWriteFailed,
    OneWireNoPresence,
    OneWireCrcMismatch,
    OneWireInvalidScratchpad,
    NoTemperatureProbe,
    PowerMonitor,
    RadioError,
    PayloadOverflow,
    MalformedPayload,
    DisplayFailed,
}

impl From<core::convert::Infallible> for Error {
    fn from(value: core::convert::Infallible) -> Self {
        match value {}
    }
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Error::PayloadOverflow
    }
}

#[cfg(feature = "rp2040")]
impl From<embassy_rp::adc::Error> for Error {
    fn from(value: embassy_rp::adc::Error) -> Self {
        match value {
            embassy_rp::adc::Error::ConversionFailed => Error::AdcFailed,
        }
    }
}

#[cfg(feature = "rp2040")]
impl From<lora_phy::mod_params::RadioError> for Error {
    fn from(_: lora_phy::mod_params::RadioError) -> Self {
        Error::RadioError
    }
}
