use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::Config;
use crate::error::Error;
use crate::sensor::PowerMonitor;

const REG_CONFIG: u8 = 0x00;
const REG_SHUNT_VOLTAGE: u8 = 0x01;
const REG_BUS_VOLTAGE: u8 = 0x02;

// 16V bus range, /8 gain (320mV), 12 bit bus and shunt ADC
const CONFIG_BASE: u16 = (0b11 << 11) | (0b0011 << 7) | (0b0011 << 3);
const MODE_POWER_DOWN: u16 = 0b000;
const MODE_SHUNT_BUS_CONTINUOUS: u16 = 0b111;

const BUS_VOLTAGE_LSB_V: f32 = 0.004;
const SHUNT_VOLTAGE_LSB_MV: f32 = 0.01;

/// INA219 high side monitor between the battery and the load.
pub struct Ina219<B, D> {
    addr: u8,
    bus: B,
    delay: D,
    shunt_ohms: f32,
}

impl<B: I2c, D: DelayNs> Ina219<B, D> {
    pub fn new(addr: u8, bus: B, delay: D, shunt_ohms: f32) -> Self {
        Self {
            addr,
            bus,
            delay,
            shunt_ohms,
        }
    }

    async fn write(&mut self, reg: u8, value: u16) -> Result<(), Error> {
        let [hi, lo] = value.to_be_bytes();
        self.bus.write(self.addr, &[reg, hi, lo]).await.map_err(|_| Error::I2CBusWriteFailed)
    }

    async fn read(&mut self, reg: u8) -> Result<u16, Error> {
        let mut buffer = [0u8; 2];
        self.bus
            .write_read(self.addr, &[reg], &mut buffer)
            .await
            .map_err(|_| Error::I2CBusReadFailed)?;

        Ok(u16::from_be_bytes(buffer))
    }
}

impl<B: I2c, D: DelayNs> PowerMonitor for Ina219<B, D> {
    async fn voltage(&mut self) -> Result<f32, Error> {
        let raw = self.read(REG_BUS_VOLTAGE).await?;

        // bit 0 flags a math overflow, the reading is garbage then
        if raw & 0x01 != 0 {
            return Err(Error::PowerMonitor);
        }

        Ok((raw >> 3) as f32 * BUS_VOLTAGE_LSB_V)
    }

    async fn current(&mut self) -> Result<f32, Error> {
        let raw = self.read(REG_SHUNT_VOLTAGE).await? as i16;
        let shunt_mv = raw as f32 * SHUNT_VOLTAGE_LSB_MV;

        Ok(shunt_mv / self.shunt_ohms)
    }

    async fn sleep(&mut self) -> Result<(), Error> {
        self.write(REG_CONFIG, CONFIG_BASE | MODE_POWER_DOWN).await
    }

    async fn wake(&mut self) -> Result<(), Error> {
        self.write(REG_CONFIG, CONFIG_BASE | MODE_SHUNT_BUS_CONTINUOUS).await?;

        // wait for one conversion according to datasheet
        self.delay.delay_us(Config::POWER_MONITOR_WAKE_US).await;

        Ok(())
    }
}
