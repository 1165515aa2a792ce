use embedded_hal_async::delay::DelayNs;

use crate::board::Board;
use crate::classifier::{classify, MoistureClass};
use crate::config::Config;
use crate::error::Error;
use crate::sensor::{MoistureSensor, OneWireAddress, PowerMonitor, Probe, TemperatureBus};

/// One pass over every sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub moisture_1: u16,
    pub moisture_2: u16,
    pub temperature: f32,
    pub voltage: f32,
    pub current: f32,
}

/// Burst average, the values that go on the air.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AveragedReading {
    pub temperature_avg: i32,
    pub moisture_1_avg: i32,
    pub moisture_2_avg: i32,
    pub voltage_avg: f32,
    pub current_avg: f32,
    pub moisture_1_class: MoistureClass,
    pub moisture_2_class: MoistureClass,
}

#[derive(Default)]
struct Accumulator {
    moisture_1: u32,
    moisture_2: u32,
    temperature: f32,
    voltage: f32,
    current: f32,
    count: u32,
}

impl Accumulator {
    fn add(&mut self, sample: &SensorSample) {
        self.moisture_1 += sample.moisture_1 as u32;
        self.moisture_2 += sample.moisture_2 as u32;
        self.temperature += sample.temperature;
        self.voltage += sample.voltage;
        self.current += sample.current;
        self.count += 1;
    }

    fn average(&self) -> Result<AveragedReading, Error> {
        if self.count == 0 {
            return Err(Error::InvalidReadingCount);
        }

        let n = self.count;
        let moisture_1_avg = (self.moisture_1 / n) as i32;
        let moisture_2_avg = (self.moisture_2 / n) as i32;

        Ok(AveragedReading {
            temperature_avg: (self.temperature / n as f32) as i32,
            moisture_1_avg,
            moisture_2_avg,
            voltage_avg: round_hundredths(self.voltage / n as f32),
            current_avg: round_hundredths(self.current / n as f32),
            moisture_1_class: classify(moisture_1_avg),
            moisture_2_class: classify(moisture_2_avg),
        })
    }
}

// no libm on the target, round half away from zero by hand
fn round_hundredths(value: f32) -> f32 {
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let scaled: i32 = ((value * 100.0) + 0.5 * sign) as i32;

    scaled as f32 / 100.0
}

impl<M, T, P, R, D, Dl> Board<M, T, P, R, D, Dl>
where
    M: MoistureSensor,
    T: TemperatureBus,
    P: PowerMonitor,
    Dl: DelayNs,
{
    /// Averages `readings` consecutive samples. Any failed read aborts the burst,
    /// no partial average is ever produced.
    pub async fn run_burst(&mut self, devices: &[OneWireAddress], readings: u8) -> Result<AveragedReading, Error> {
        if readings == 0 {
            return Err(Error::InvalidReadingCount);
        }

        let mut acc = Accumulator::default();

        debug!("averaging sensor readings");
        debug!(" S_1  S_2  TEMP VOLT    MAMP");

        for _ in 0..readings {
            let sample = self.sample(devices).await?;

            debug!(
                "{} {} {} {} {}",
                sample.moisture_1,
                sample.moisture_2,
                sample.temperature,
                sample.voltage,
                sample.current
            );

            acc.add(&sample);
        }

        acc.average()
    }

    async fn sample(&mut self, devices: &[OneWireAddress]) -> Result<SensorSample, Error> {
        let moisture_1 = self.moisture.read(Probe::First).await?;
        let moisture_2 = self.moisture.read(Probe::Second).await?;

        self.power.wake().await?;
        let voltage = self.power.voltage().await?;
        let current = self.power.current().await?;
        self.power.sleep().await?;

        self.temperature.convert().await?;
        // conversions read back before this are stale
        self.delay.delay_ms(Config::TEMPERATURE_CONVERSION_MS).await;

        // only one probe is fitted in practice, with more the last one read wins
        let mut temperature = None;
        for device in devices {
            temperature = Some(self.temperature.read(device).await?);
        }
        let temperature = temperature.ok_or(Error::NoTemperatureProbe)?;

        Ok(SensorSample {
            moisture_1,
            moisture_2,
            temperature,
            voltage,
            current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Failure};
    use embassy_futures::block_on;

    #[test]
    fn constant_input_averages_to_itself() {
        let mut board = mock::board(mock::Readings {
            moisture_1: 1500,
            moisture_2: 3200,
            temperature: 21.0,
            voltage: 3.9,
            current: 12.34,
        });
        let devices = mock::devices();

        let reading = block_on(board.run_burst(&devices, 5)).unwrap();

        assert_eq!(
            reading,
            AveragedReading {
                temperature_avg: 21,
                moisture_1_avg: 1500,
                moisture_2_avg: 3200,
                voltage_avg: 3.9,
                current_avg: 12.34,
                moisture_1_class: MoistureClass::Level(9),
                moisture_2_class: MoistureClass::Level(1),
            }
        );
    }

    #[test]
    fn moisture_and_temperature_truncate() {
        let mut acc = Accumulator::default();
        for (m, t) in [(1000, 20.9), (1001, 21.9), (1001, 21.9)] {
            acc.add(&SensorSample {
                moisture_1: m,
                moisture_2: m,
                temperature: t,
                voltage: 3.333,
                current: 10.005,
            });
        }

        let reading = acc.average().unwrap();

        assert_eq!(reading.moisture_1_avg, 1000);
        assert_eq!(reading.temperature_avg, 21);
        assert_eq!(reading.voltage_avg, 3.33);
        assert_eq!(round_hundredths(-1.256), -1.26);
        assert_eq!(round_hundredths(12.344), 12.34);
    }

    #[test]
    fn every_sample_waits_for_the_temperature_conversion() {
        let mut board = mock::board(mock::Readings::default());
        let devices = mock::devices();

        block_on(board.run_burst(&devices, 5)).unwrap();

        assert_eq!(board.delay.elapsed_ms(), 5 * Config::TEMPERATURE_CONVERSION_MS as u64);
        assert_eq!(board.temperature.conversions, 5);
    }

    #[test]
    fn temperature_is_read_only_after_the_conversion_settles() {
        let mut board = mock::board(mock::Readings::default());
        let devices = mock::devices();

        block_on(board.run_burst(&devices, 3)).unwrap();

        let settle = format!("delay.{}", Config::TEMPERATURE_CONVERSION_MS);
        let events = board.power.events.take();
        let ordered: Vec<_> = events
            .iter()
            .filter(|e| *e == "power.sleep" || e.starts_with("temperature") || **e == settle)
            .map(String::as_str)
            .collect();

        let sample = ["power.sleep", "temperature.convert", settle.as_str(), "temperature.read"];
        assert_eq!(ordered, sample.repeat(3));
    }

    #[test]
    fn power_monitor_is_woken_before_and_slept_after_each_read() {
        let mut board = mock::board(mock::Readings::default());
        let devices = mock::devices();

        block_on(board.run_burst(&devices, 2)).unwrap();

        let events = board.power.events.take();
        let power: Vec<_> = events.iter().filter(|e| e.starts_with("power")).map(String::as_str).collect();
        assert_eq!(
            power,
            [
                "power.wake",
                "power.voltage",
                "power.current",
                "power.sleep",
                "power.wake",
                "power.voltage",
                "power.current",
                "power.sleep"
            ]
        );
        assert!(board.power.asleep);
    }

    #[test]
    fn last_probe_on_the_bus_wins() {
        let mut board = mock::board(mock::Readings::default());
        board.temperature.per_device = vec![18.0, 30.0];
        let devices = [OneWireAddress(0x28), OneWireAddress(0x0128)];

        let reading = block_on(board.run_burst(&devices, 1)).unwrap();

        assert_eq!(reading.temperature_avg, 30);
    }

    #[test]
    fn failed_read_aborts_the_burst() {
        let mut board = mock::board(mock::Readings::default());
        board.power.failure = Failure::OnCall(3);
        let devices = mock::devices();

        assert_eq!(block_on(board.run_burst(&devices, 5)), Err(Error::PowerMonitor));
    }

    #[test]
    fn burst_needs_a_probe_and_a_count() {
        let mut board = mock::board(mock::Readings::default());

        assert_eq!(block_on(board.run_burst(&[], 5)), Err(Error::NoTemperatureProbe));
        assert_eq!(block_on(board.run_burst(&mock::devices(), 0)), Err(Error::InvalidReadingCount));
    }
}
