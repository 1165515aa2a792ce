//! In-memory doubles for every hardware seam, shared by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, Operation};

use crate::board::{Board, BoardBuilder};
use crate::display::{DisplaySurface, NoDisplay};
use crate::error::Error;
use crate::power::DeepSleep;
use crate::radio::{PacketStatus, RadioLink};
use crate::sensor::ds18b20::{crc8, OneWire};
use crate::sensor::{Devices, MoistureSensor, OneWireAddress, PowerMonitor, Probe, TemperatureBus};

/// Ordered log of hardware calls, shared between the mocks of one board.
#[derive(Clone, Default)]
pub struct Events(Rc<RefCell<Vec<String>>>);

impl Events {
    pub fn push(&self, event: &str) {
        self.0.borrow_mut().push(event.to_string());
    }

    pub fn take(&self) -> Vec<String> {
        self.0.take()
    }
}

/// When a mock should fail, counted over its fallible calls starting at 1.
#[derive(Debug, Clone, Default)]
pub enum Failure {
    #[default]
    Never,
    Always,
    OnCall(usize),
    OnCalls(Vec<usize>),
}

impl Failure {
    fn hits(&self, call: usize) -> bool {
        match self {
            Failure::Never => false,
            Failure::Always => true,
            Failure::OnCall(n) => *n == call,
            Failure::OnCalls(calls) => calls.contains(&call),
        }
    }
}

#[derive(Default)]
pub struct MockDelay {
    pub events: Events,
    elapsed_ns: u64,
}

impl MockDelay {
    pub fn new(events: &Events) -> Self {
        Self {
            events: events.clone(),
            elapsed_ns: 0,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }

    async fn delay_us(&mut self, us: u32) {
        self.elapsed_ns += us as u64 * 1_000;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.events.push(&format!("delay.{}", ms));
        self.elapsed_ns += ms as u64 * 1_000_000;
    }
}

/// Register file of a 16 bit register I2C device.
#[derive(Default)]
pub struct MockI2c {
    pub registers: HashMap<u8, u16>,
    pub fail: bool,
    pub(crate) pointer: u8,
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    async fn transaction(&mut self, _address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::Other);
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let bytes: &[u8] = bytes;
                    if let Some(&reg) = bytes.first() {
                        self.pointer = reg;
                    }
                    if let &[reg, hi, lo] = bytes {
                        self.registers.insert(reg, u16::from_be_bytes([hi, lo]));
                    }
                }
                Operation::Read(buffer) => {
                    let value = self.registers.get(&self.pointer).copied().unwrap_or(0);
                    for (byte, v) in buffer.iter_mut().zip(value.to_be_bytes()) {
                        *byte = v;
                    }
                }
            }
        }

        Ok(())
    }
}

pub struct MockOneWire {
    pub present: bool,
    pub devices: Devices,
    pub scratchpad: [u8; 9],
    pub written: Vec<u8>,
}

impl Default for MockOneWire {
    fn default() -> Self {
        // 21.0 °C
        let mut scratchpad = [0x50, 0x01, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0];
        scratchpad[8] = crc8(&scratchpad[..8]);

        Self {
            present: true,
            devices: Devices::new(),
            scratchpad,
            written: Vec::new(),
        }
    }
}

impl OneWire for MockOneWire {
    async fn reset(&mut self) -> bool {
        self.present
    }

    async fn write_bytes(&mut self, bytes: &[u8]) {
        self.written.extend_from_slice(bytes);
    }

    async fn read_bytes(&mut self, buffer: &mut [u8]) {
        let len = buffer.len().min(self.scratchpad.len());
        buffer[..len].copy_from_slice(&self.scratchpad[..len]);
    }

    async fn search(&mut self) -> Devices {
        self.devices.clone()
    }
}

pub struct MockMoisture {
    pub events: Events,
    pub values: [u16; 2],
    pub powered: bool,
    pub reads: usize,
    pub switched: usize,
    pub failure: Failure,
    calls: usize,
}

impl MockMoisture {
    pub fn new(events: &Events, moisture_1: u16, moisture_2: u16) -> Self {
        Self {
            events: events.clone(),
            values: [moisture_1, moisture_2],
            powered: false,
            reads: 0,
            switched: 0,
            failure: Failure::Never,
            calls: 0,
        }
    }

    fn call(&mut self, event: &str) -> Result<(), Error> {
        self.calls += 1;
        self.events.push(event);
        if self.failure.hits(self.calls) {
            return Err(Error::AdcFailed);
        }
        Ok(())
    }
}

impl MoistureSensor for MockMoisture {
    async fn on(&mut self) -> Result<(), Error> {
        self.switched += 1;
        self.call("moisture.on")?;
        self.powered = true;
        Ok(())
    }

    async fn off(&mut self) -> Result<(), Error> {
        self.switched += 1;
        self.call("moisture.off")?;
        self.powered = false;
        Ok(())
    }

    async fn read(&mut self, probe: Probe) -> Result<u16, Error> {
        self.reads += 1;
        self.call("moisture.read")?;
        Ok(match probe {
            Probe::First => self.values[0],
            Probe::Second => self.values[1],
        })
    }
}

pub struct MockThermometer {
    pub events: Events,
    pub temperature: f32,
    /// Readings handed out in turn, `temperature` is used while empty
    pub per_device: Vec<f32>,
    pub devices: Devices,
    pub discoveries: usize,
    pub conversions: usize,
    pub reads: usize,
    pub failure: Failure,
    calls: usize,
}

impl MockThermometer {
    pub fn new(events: &Events, temperature: f32) -> Self {
        Self {
            events: events.clone(),
            temperature,
            per_device: Vec::new(),
            devices: devices(),
            discoveries: 0,
            conversions: 0,
            reads: 0,
            failure: Failure::Never,
            calls: 0,
        }
    }

    fn call(&mut self, event: &str) -> Result<(), Error> {
        self.calls += 1;
        self.events.push(event);
        if self.failure.hits(self.calls) {
            return Err(Error::OneWireCrcMismatch);
        }
        Ok(())
    }
}

impl TemperatureBus for MockThermometer {
    async fn discover(&mut self) -> Result<Devices, Error> {
        self.discoveries += 1;
        self.call("temperature.discover")?;
        Ok(self.devices.clone())
    }

    async fn convert(&mut self) -> Result<(), Error> {
        self.conversions += 1;
        self.call("temperature.convert")
    }

    async fn read(&mut self, _device: &OneWireAddress) -> Result<f32, Error> {
        let turn = self.reads;
        self.reads += 1;
        self.call("temperature.read")?;

        if self.per_device.is_empty() {
            Ok(self.temperature)
        } else {
            Ok(self.per_device[turn % self.per_device.len()])
        }
    }
}

pub struct MockPowerMonitor {
    pub events: Events,
    pub voltage: f32,
    pub current: f32,
    pub asleep: bool,
    pub failure: Failure,
    calls: usize,
}

impl MockPowerMonitor {
    pub fn new(events: &Events, voltage: f32, current: f32) -> Self {
        Self {
            events: events.clone(),
            voltage,
            current,
            asleep: true,
            failure: Failure::Never,
            calls: 0,
        }
    }

    fn call(&mut self, event: &str) -> Result<(), Error> {
        self.calls += 1;
        self.events.push(event);
        if self.failure.hits(self.calls) {
            return Err(Error::PowerMonitor);
        }
        Ok(())
    }
}

impl PowerMonitor for MockPowerMonitor {
    async fn voltage(&mut self) -> Result<f32, Error> {
        self.call("power.voltage")?;
        Ok(self.voltage)
    }

    async fn current(&mut self) -> Result<f32, Error> {
        self.call("power.current")?;
        Ok(self.current)
    }

    async fn sleep(&mut self) -> Result<(), Error> {
        self.call("power.sleep")?;
        self.asleep = true;
        Ok(())
    }

    async fn wake(&mut self) -> Result<(), Error> {
        self.call("power.wake")?;
        self.asleep = false;
        Ok(())
    }
}

pub struct MockRadio {
    pub events: Events,
    /// Payloads the radio accepted
    pub sent: Vec<String>,
    /// Packets waiting to be received, with their RSSI
    pub inbound: VecDeque<(Vec<u8>, i16)>,
    pub rssi: i16,
    pub calls: usize,
    pub failure: Failure,
}

impl MockRadio {
    pub fn new(events: &Events) -> Self {
        Self {
            events: events.clone(),
            sent: Vec::new(),
            inbound: VecDeque::new(),
            rssi: -87,
            calls: 0,
            failure: Failure::Never,
        }
    }
}

impl RadioLink for MockRadio {
    async fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.calls += 1;
        self.events.push("radio.send");
        if self.failure.hits(self.calls) {
            return Err(Error::RadioError);
        }

        self.sent.push(String::from_utf8_lossy(payload).into_owned());
        Ok(())
    }

    fn signal_strength(&self) -> i16 {
        self.rssi
    }

    async fn receive(&mut self, buffer: &mut [u8], _timeout: Duration) -> Result<Option<PacketStatus>, Error> {
        self.calls += 1;
        self.events.push("radio.receive");
        if self.failure.hits(self.calls) {
            return Err(Error::RadioError);
        }

        let Some((packet, rssi)) = self.inbound.pop_front() else {
            return Ok(None);
        };

        let len = packet.len().min(buffer.len());
        buffer[..len].copy_from_slice(&packet[..len]);
        self.rssi = rssi;

        Ok(Some(PacketStatus { len, rssi }))
    }
}

/// Frame buffer that remembers what was drawn since the last clear.
#[derive(Default)]
pub struct MockDisplay {
    pub lines: Vec<(String, i32, i32)>,
    pub rects: Vec<(i32, i32, u32, u32)>,
    pub fills: Vec<(i32, i32, u32, u32)>,
    pub clears: usize,
    pub frames: usize,
    pub broken: bool,
}

impl MockDisplay {
    fn check(&self) -> Result<(), Error> {
        if self.broken {
            Err(Error::DisplayFailed)
        } else {
            Ok(())
        }
    }
}

impl DisplaySurface for MockDisplay {
    async fn clear(&mut self) -> Result<(), Error> {
        self.check()?;
        self.lines.clear();
        self.rects.clear();
        self.fills.clear();
        self.clears += 1;
        Ok(())
    }

    async fn text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Error> {
        self.check()?;
        self.lines.push((text.to_string(), x, y));
        Ok(())
    }

    async fn rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), Error> {
        self.check()?;
        self.rects.push((x, y, width, height));
        Ok(())
    }

    async fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), Error> {
        self.check()?;
        self.fills.push((x, y, width, height));
        Ok(())
    }

    async fn show(&mut self) -> Result<(), Error> {
        self.check()?;
        self.frames += 1;
        Ok(())
    }
}

pub struct MockSleep {
    pub events: Events,
    pub slept: Option<Duration>,
}

impl MockSleep {
    pub fn new(events: &Events) -> Self {
        Self {
            events: events.clone(),
            slept: None,
        }
    }
}

impl DeepSleep for MockSleep {
    async fn enter(&mut self, duration: Duration) {
        self.events.push("sleep");
        self.slept = Some(duration);
    }
}

/// Constant sensor values seen by a mock board.
#[derive(Debug, Clone, Copy)]
pub struct Readings {
    pub moisture_1: u16,
    pub moisture_2: u16,
    pub temperature: f32,
    pub voltage: f32,
    pub current: f32,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            moisture_1: 1500,
            moisture_2: 3200,
            temperature: 21.0,
            voltage: 3.9,
            current: 12.34,
        }
    }
}

pub type MockBoard<D = NoDisplay> = Board<MockMoisture, MockThermometer, MockPowerMonitor, MockRadio, D, MockDelay>;

pub fn board(readings: Readings) -> MockBoard {
    board_with_display(readings, NoDisplay)
}

pub fn board_with_display<D>(readings: Readings, display: D) -> MockBoard<D> {
    let events = Events::default();

    match BoardBuilder::new()
        .with_moisture_sensor(MockMoisture::new(&events, readings.moisture_1, readings.moisture_2))
        .with_temperature_bus(MockThermometer::new(&events, readings.temperature))
        .with_power_monitor(MockPowerMonitor::new(&events, readings.voltage, readings.current))
        .with_radio(MockRadio::new(&events))
        .with_display(display)
        .with_delay(MockDelay::new(&events))
        .build()
    {
        Ok(board) => board,
        Err(e) => panic!("mock board is complete: {:?}", e),
    }
}

/// A single DS18B20 on the bus.
pub fn devices() -> Devices {
    let mut devices = Devices::new();
    let _ = devices.push(OneWireAddress(0x9A00_0000_5C3D_1A28));
    devices
}
