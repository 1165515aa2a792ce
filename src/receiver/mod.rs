use core::fmt::Write;

use embassy_time::Duration;

use crate::classifier::MoistureClass;
use crate::display::{DisplaySurface, Line, LINE_HEIGHT};
use crate::error::Error;
use crate::payload::{self, DecodedPayload, PAYLOAD_CAPACITY};
use crate::radio::RadioLink;

const BAR_X: i32 = 84;
const BAR_Y: [i32; 2] = [30, 40];
const BAR_WIDTH: u32 = 20;
const BAR_HEIGHT: u32 = 8;
const BAR_FILL_MAX: u32 = 16;

/// Fill of a moisture gauge, two pixels per level.
pub fn bar_width(class: MoistureClass) -> u32 {
    match class.level() {
        Some(level) => (level as u32 * 2).min(BAR_FILL_MAX),
        None => 0,
    }
}

/// A packet that decoded cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct Reception {
    pub payload: DecodedPayload,
    pub rssi: i16,
    pub sequence: u32,
}

pub fn status_lines(reception: &Reception) -> Result<[Line; 6], Error> {
    let packet = &reception.payload;
    let mut lines: [Line; 6] = Default::default();

    write!(lines[0], "RX #{}", reception.sequence)?;
    write!(lines[1], "POD_ID={} TEMP={}", packet.pod_id, packet.temperature)?;
    write!(lines[2], "RSSI= {}", reception.rssi)?;
    write!(lines[3], "S1={},{}", packet.moisture_1_class, packet.moisture_1)?;
    write!(lines[4], "S2={},{}", packet.moisture_2_class, packet.moisture_2)?;
    write!(lines[5], "V={:.2}, I={:.2}", packet.voltage, packet.current)?;

    Ok(lines)
}

/// Gateway side of the link: listens, decodes and shows the last packet.
pub struct Receiver<R, D> {
    pub radio: R,
    pub display: D,
    received: u32,
    buffer: [u8; PAYLOAD_CAPACITY],
}

impl<R: RadioLink, D: DisplaySurface> Receiver<R, D> {
    pub fn new(radio: R, display: D) -> Self {
        Self {
            radio,
            display,
            received: 0,
            buffer: [0; PAYLOAD_CAPACITY],
        }
    }

    /// Screen shown until the first packet arrives
    pub async fn wait_screen(&mut self) -> Result<(), Error> {
        self.display.clear().await?;
        self.display.text("WAIT SIGNAL...", 0, 0).await?;
        self.display.show().await
    }

    /// Waits up to `timeout` for one packet. Ok(None) on timeout, malformed
    /// packets are logged and reported as `MalformedPayload`.
    pub async fn receive_next(&mut self, timeout: Duration) -> Result<Option<Reception>, Error> {
        let Some(status) = self.radio.receive(&mut self.buffer, timeout).await? else {
            return Ok(None);
        };

        let bytes = &self.buffer[..status.len];
        let payload = match payload::decode(bytes) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("dropping malformed packet of {} bytes [rssi {}]", status.len, status.rssi);
                return Err(e);
            }
        };

        self.received = self.received.wrapping_add(1);
        info!(
            "pod {}: temp {} s1 {} ({}) s2 {} ({}) {} V {} mA [rssi {}]",
            payload.pod_id.as_str(),
            payload.temperature,
            payload.moisture_1,
            payload.moisture_1_class.level().unwrap_or(u8::MAX),
            payload.moisture_2,
            payload.moisture_2_class.level().unwrap_or(u8::MAX),
            payload.voltage,
            payload.current,
            status.rssi
        );

        Ok(Some(Reception {
            payload,
            rssi: status.rssi,
            sequence: self.received,
        }))
    }

    pub async fn show(&mut self, reception: &Reception) -> Result<(), Error> {
        let lines = status_lines(reception)?;

        self.display.clear().await?;
        for (row, line) in lines.iter().enumerate() {
            self.display.text(line, 0, row as i32 * LINE_HEIGHT).await?;
        }

        let classes = [reception.payload.moisture_1_class, reception.payload.moisture_2_class];
        for (y, class) in BAR_Y.into_iter().zip(classes) {
            self.display.rect(BAR_X, y, BAR_WIDTH, BAR_HEIGHT).await?;
            self.display.fill_rect(BAR_X + 2, y + 2, bar_width(class), 4).await?;
        }

        self.display.show().await
    }

    /// One listen cycle, never fails. Returns whether a packet was shown.
    pub async fn poll(&mut self, timeout: Duration) -> bool {
        match self.receive_next(timeout).await {
            Ok(Some(reception)) => {
                if let Err(e) = self.show(&reception).await {
                    warn!("display: failed to draw packet {:?}", e);
                }
                true
            }
            Ok(None) => {
                debug!("no packet within {} ms", timeout.as_millis());
                false
            }
            Err(e) => {
                warn!("receive failed: {:?}", e);
                false
            }
        }
    }
}
