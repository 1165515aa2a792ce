use crate::error::Error;
use crate::sensor::{Devices, OneWireAddress, TemperatureBus};

const SKIP_ROM: u8 = 0xCC;
const MATCH_ROM: u8 = 0x55;
const CONVERT_T: u8 = 0x44;
const READ_SCRATCHPAD: u8 = 0xBE;

const FAMILY_CODE: u8 = 0x28;

/// Byte level access to a one-wire bus, bit timing is handled below this.
pub trait OneWire {
    /// Reset pulse, returns true if at least one device answered with a presence pulse
    async fn reset(&mut self) -> bool;

    async fn write_bytes(&mut self, bytes: &[u8]);

    async fn read_bytes(&mut self, buffer: &mut [u8]);

    /// Enumerate the ROM codes of every device on the bus
    async fn search(&mut self) -> Devices;
}

impl<T: OneWire> OneWire for &mut T {
    async fn reset(&mut self) -> bool {
        T::reset(self).await
    }

    async fn write_bytes(&mut self, bytes: &[u8]) {
        T::write_bytes(self, bytes).await
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) {
        T::read_bytes(self, buffer).await
    }

    async fn search(&mut self) -> Devices {
        T::search(self).await
    }
}

pub struct Ds18b20<W> {
    wire: W,
}

impl<W: OneWire> Ds18b20<W> {
    pub fn new(wire: W) -> Self {
        Self { wire }
    }

    async fn reset(&mut self) -> Result<(), Error> {
        if self.wire.reset().await {
            Ok(())
        } else {
            Err(Error::OneWireNoPresence)
        }
    }
}

impl<W: OneWire> TemperatureBus for Ds18b20<W> {
    async fn discover(&mut self) -> Result<Devices, Error> {
        self.reset().await?;

        let devices = self
            .wire
            .search()
            .await
            .into_iter()
            .filter(|address| address.0 as u8 == FAMILY_CODE)
            .collect();

        Ok(devices)
    }

    async fn convert(&mut self) -> Result<(), Error> {
        self.reset().await?;
        self.wire.write_bytes(&[SKIP_ROM, CONVERT_T]).await;

        Ok(())
    }

    async fn read(&mut self, device: &OneWireAddress) -> Result<f32, Error> {
        self.reset().await?;
        self.wire.write_bytes(&[MATCH_ROM]).await;
        self.wire.write_bytes(&device.0.to_le_bytes()).await;
        self.wire.write_bytes(&[READ_SCRATCHPAD]).await;

        let mut scratchpad = [0u8; 9];
        self.wire.read_bytes(&mut scratchpad).await;

        decode_scratchpad(&scratchpad)
    }
}

/// Temperature in °C from a scratchpad read, checked against its CRC byte
/// and the bits the sensor always reports fixed.
pub fn decode_scratchpad(scratchpad: &[u8; 9]) -> Result<f32, Error> {
    if crc8(&scratchpad[..8]) != scratchpad[8] {
        return Err(Error::OneWireCrcMismatch);
    }

    // a floating or shorted bus reads all zeros, which still passes the CRC
    if scratchpad[4] & 0x9F != 0x1F || scratchpad[5] != 0xFF {
        return Err(Error::OneWireInvalidScratchpad);
    }

    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);

    Ok(raw as f32 / 16.0)
}

/// Dallas/Maxim CRC-8, polynomial x^8 + x^5 + x^4 + 1.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for byte in data {
        let mut byte = *byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}
