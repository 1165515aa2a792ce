#![no_std]
#![no_main]

use assign_resources::assign_resources;
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals;
use embassy_rp::Peri;
use embassy_rp::spi::{self, Spi};
use lora_soil_pod::config::Config;
use lora_soil_pod::display::{DisplaySurface, NoDisplay};
use lora_soil_pod::hw::{LoraLink, Oled};
use lora_soil_pod::radio::RadioLink;
use lora_soil_pod::receiver::Receiver;
use {defmt_rtt as _, panic_probe as _};

assign_resources! {
    oled: OledRes {
        i2c0: I2C0,
        sda: PIN_16,
        scl: PIN_17,
    },
    xcvr: Xcvr {
        busy: PIN_2,
        cs: PIN_3,
        clk: PIN_10,
        mosi: PIN_11,
        miso: PIN_12,
        rst: PIN_15,
        dio1: PIN_20,
        dma_ch0: DMA_CH0,
        dma_ch1: DMA_CH1,
        spi1: SPI1,
    }
}

#[embassy_executor::main]
async fn main(_s: Spawner) {
    let p = embassy_rp::init(Default::default());
    let r = split_resources! {p};

    let nss = Output::new(r.xcvr.cs, Level::High);
    let reset = Output::new(r.xcvr.rst, Level::High);
    let dio1 = Input::new(r.xcvr.dio1, Pull::None);
    let busy = Input::new(r.xcvr.busy, Pull::None);
    let spi = Spi::new(
        r.xcvr.spi1,
        r.xcvr.clk,
        r.xcvr.mosi,
        r.xcvr.miso,
        r.xcvr.dma_ch0,
        r.xcvr.dma_ch1,
        spi::Config::default(),
    );
    let radio = LoraLink::try_new(spi, nss, reset, dio1, busy)
        .await
        .expect("radio module should be connected");

    let i2c = I2c::new_blocking(r.oled.i2c0, r.oled.scl, r.oled.sda, i2c::Config::default());
    match Oled::try_new(i2c) {
        Ok(oled) => listen(Receiver::new(radio, oled)).await,
        Err(e) => {
            warn!("display: not responding, logging only {:?}", e);
            listen(Receiver::new(radio, NoDisplay)).await
        }
    }
}

async fn listen<R: RadioLink, D: DisplaySurface>(mut receiver: Receiver<R, D>) -> ! {
    if let Err(e) = receiver.wait_screen().await {
        warn!("display: failed to draw wait screen {:?}", e);
    }

    info!("receiver: listening on {} Hz", Config::LORA_FREQUENCY_HZ);
    loop {
        receiver.poll(Config::RECEIVER_TIMEOUT).await;
    }
}
