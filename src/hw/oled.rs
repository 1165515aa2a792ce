use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::display::DisplaySurface;
use crate::error::Error;

type Panel<I> = Ssd1306<I2CInterface<I>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

/// SSD1306 128x64 panel on a blocking I2C bus.
pub struct Oled<I> {
    panel: Panel<I>,
}

impl<I: embedded_hal_1::i2c::I2c> Oled<I> {
    pub fn try_new(i2c: I) -> Result<Self, Error> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0).into_buffered_graphics_mode();
        panel.init().map_err(|_| Error::DisplayFailed)?;

        Ok(Self { panel })
    }
}

impl<I: embedded_hal_1::i2c::I2c> DisplaySurface for Oled<I> {
    async fn clear(&mut self) -> Result<(), Error> {
        self.panel.clear_buffer();
        Ok(())
    }

    async fn text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Error> {
        Text::with_baseline(text, Point::new(x, y), STYLE, Baseline::Top)
            .draw(&mut self.panel)
            .map_err(|_| Error::DisplayFailed)?;

        Ok(())
    }

    async fn rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), Error> {
        Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.panel)
            .map_err(|_| Error::DisplayFailed)
    }

    async fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), Error> {
        Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut self.panel)
            .map_err(|_| Error::DisplayFailed)
    }

    async fn show(&mut self) -> Result<(), Error> {
        self.panel.flush().map_err(|_| Error::DisplayFailed)
    }
}
