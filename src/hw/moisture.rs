use embassy_rp::adc::{self, Adc, Async};
use embassy_rp::gpio::Output;

use crate::error::Error;
use crate::sensor::{MoistureSensor, Probe};

/// Two capacitive probes on ADC pins, each fed from its own GPIO rail.
pub struct SoilProbes {
    adc: Adc<'static, Async>,
    sig: [adc::Channel<'static>; 2],
    pwr: [Output<'static>; 2],
}

impl SoilProbes {
    pub fn new(adc: Adc<'static, Async>, sig: [adc::Channel<'static>; 2], pwr: [Output<'static>; 2]) -> Self {
        Self { adc, sig, pwr }
    }
}

impl MoistureSensor for SoilProbes {
    async fn on(&mut self) -> Result<(), Error> {
        for pwr in self.pwr.iter_mut() {
            if pwr.is_set_low() {
                pwr.set_high();
            }
        }

        Ok(())
    }

    async fn off(&mut self) -> Result<(), Error> {
        for pwr in self.pwr.iter_mut() {
            if pwr.is_set_high() {
                pwr.set_low();
            }
        }

        Ok(())
    }

    async fn read(&mut self, probe: Probe) -> Result<u16, Error> {
        let sig = match probe {
            Probe::First => &mut self.sig[0],
            Probe::Second => &mut self.sig[1],
        };

        Ok(self.adc.read(sig).await?)
    }
}
