use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::onewire::{PioOneWire, PioOneWireSearch};

use crate::sensor::ds18b20::{crc8, OneWire};
use crate::sensor::{Devices, OneWireAddress};

/// One-wire master running on a PIO state machine.
pub struct PioBus<'d, PIO: Instance, const SM: usize> {
    wire: PioOneWire<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> PioBus<'d, PIO, SM> {
    pub fn new(wire: PioOneWire<'d, PIO, SM>) -> Self {
        Self { wire }
    }
}

impl<'d, PIO: Instance, const SM: usize> OneWire for PioBus<'d, PIO, SM> {
    async fn reset(&mut self) -> bool {
        self.wire.reset().await
    }

    async fn write_bytes(&mut self, bytes: &[u8]) {
        self.wire.write_bytes(bytes).await
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) {
        self.wire.read_bytes(buffer).await
    }

    async fn search(&mut self) -> Devices {
        let mut devices = Devices::new();
        let mut search = PioOneWireSearch::new();

        while !search.is_finished() {
            let Some(address) = search.next(&mut self.wire).await else {
                break;
            };

            // the last ROM byte is the CRC of the first seven
            if crc8(&address.to_le_bytes()) != 0 {
                warn!("one-wire: skipping ROM {:x} with bad CRC", address);
                continue;
            }

            if devices.push(OneWireAddress(address)).is_err() {
                warn!("one-wire: more than {} devices, ignoring the rest", devices.capacity());
                break;
            }
        }

        devices
    }
}
