use core::fmt::Write;

use heapless::String;

use crate::averager::AveragedReading;
use crate::config::PodIdentity;
use crate::error::Error;

pub const LINE_HEIGHT: i32 = 10;
pub const LINE_CAPACITY: usize = 24;

pub type Line = String<LINE_CAPACITY>;

/// Monochrome status screen, e.g. a 128x64 OLED.
///
/// The display is purely informational, nothing in the node may depend on it
/// being present or working.
pub trait DisplaySurface {
    async fn clear(&mut self) -> Result<(), Error>;

    async fn text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Error>;

    async fn rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), Error>;

    async fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), Error>;

    /// Push the frame buffer to the panel
    async fn show(&mut self) -> Result<(), Error>;
}

/// Stand-in for pods built without a screen.
pub struct NoDisplay;

impl DisplaySurface for NoDisplay {
    async fn clear(&mut self) -> Result<(), Error> {
        Ok(())
    }

    async fn text(&mut self, _text: &str, _x: i32, _y: i32) -> Result<(), Error> {
        Ok(())
    }

    async fn rect(&mut self, _x: i32, _y: i32, _width: u32, _height: u32) -> Result<(), Error> {
        Ok(())
    }

    async fn fill_rect(&mut self, _x: i32, _y: i32, _width: u32, _height: u32) -> Result<(), Error> {
        Ok(())
    }

    async fn show(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Status lines the pod shows after each burst.
pub fn pod_status(pod: &PodIdentity, reading: &AveragedReading, rssi: i16) -> Result<[Line; 6], Error> {
    let mut lines: [Line; 6] = Default::default();

    write!(lines[0], "POD_ID==>{}", pod.pod_id())?;
    write!(lines[1], "RSSI={},T={}", rssi, reading.temperature_avg)?;
    write!(lines[2], "S1={}, {}", reading.moisture_1_class, reading.moisture_1_avg)?;
    write!(lines[3], "S2={}, {}", reading.moisture_2_class, reading.moisture_2_avg)?;
    write!(lines[4], "VOLT: {:.2} V", reading.voltage_avg)?;
    write!(lines[5], "CURR: {:.2} mA", reading.current_avg)?;

    Ok(lines)
}

/// Clear the screen and draw one line per row.
pub async fn draw_lines<D: DisplaySurface>(display: &mut D, lines: &[Line]) -> Result<(), Error> {
    display.clear().await?;
    for (row, line) in lines.iter().enumerate() {
        display.text(line, 0, row as i32 * LINE_HEIGHT).await?;
    }

    Ok(())
}
