#![no_std]
#![no_main]

use assign_resources::assign_resources;
use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::Peri;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{self, I2C0, PIO0};
use embassy_rp::pio::{self, Pio};
use embassy_rp::pio_programs::onewire::{PioOneWire, PioOneWireProgram};
use embassy_rp::spi::{self, Spi};
use embassy_time::Delay;
use lora_soil_pod::board::BoardBuilder;
use lora_soil_pod::config::{Config, NodeConfig, PodIdentity};
use lora_soil_pod::display::{DisplaySurface, NoDisplay};
use lora_soil_pod::hw::{LoraLink, Oled, PioBus, ResetSleep, SoilProbes};
use lora_soil_pod::lifecycle::Node;
use lora_soil_pod::power::DeepSleep;
use lora_soil_pod::sensor::ds18b20::Ds18b20;
use lora_soil_pod::sensor::ina219::Ina219;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
});

assign_resources! {
    probes: ProbeRes {
        adc: ADC,
        sig_1: PIN_26,
        sig_2: PIN_27,
        pwr_1: PIN_6,
        pwr_2: PIN_7,
    },
    power: PowerRes {
        i2c0: I2C0,
        sda: PIN_16,
        scl: PIN_17,
    },
    thermo: ThermoRes {
        pio0: PIO0,
        data: PIN_14,
    },
    oled: OledRes {
        i2c1: I2C1,
        sda: PIN_18,
        scl: PIN_19,
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

type Thermometer = Ds18b20<PioBus<'static, PIO0, 0>>;
type PowerMonitor = Ina219<I2c<'static, I2C0, i2c::Async>, Delay>;

#[embassy_executor::main]
async fn main(_s: Spawner) {
    let p = embassy_rp::init(Default::default());
    let r = split_resources! {p};

    let pod = PodIdentity::new(Config::POD_ID, Config::SEED).expect("pod id should be a short alphanumeric token");
    info!("pod {} starting", pod.pod_id());

    // rails start low, probes stay unpowered until the sensors are initialized
    let adc = Adc::new(r.probes.adc, Irqs, adc::Config::default());
    let moisture = SoilProbes::new(
        adc,
        [
            adc::Channel::new_pin(r.probes.sig_1, Pull::None),
            adc::Channel::new_pin(r.probes.sig_2, Pull::None),
        ],
        [
            Output::new(r.probes.pwr_1, Level::Low),
            Output::new(r.probes.pwr_2, Level::Low),
        ],
    );

    let i2c = I2c::new_async(r.power.i2c0, r.power.scl, r.power.sda, Irqs, i2c::Config::default());
    let power = Ina219::new(Config::I2C_ADDR_POWER_MONITOR, i2c, Delay, Config::POWER_MONITOR_SHUNT_OHMS);

    let Pio { mut common, sm0, .. } = Pio::new(r.thermo.pio0, Irqs);
    let program = PioOneWireProgram::new(&mut common);
    let temperature = Ds18b20::new(PioBus::new(PioOneWire::new(&mut common, sm0, r.thermo.data, &program)));

    let radio = match build_radio(r.xcvr).await {
        Ok(radio) => radio,
        Err(e) => {
            error!("radio: failed to initialize {:?}", e);
            ResetSleep.enter(Config::DEEP_SLEEP_TIER_3).await;
            return;
        }
    };

    if Config::OLED_ON {
        let i2c = I2c::new_blocking(r.oled.i2c1, r.oled.scl, r.oled.sda, i2c::Config::default());
        match Oled::try_new(i2c) {
            Ok(oled) => run(pod, moisture, temperature, power, radio, oled).await,
            Err(e) => {
                warn!("display: not responding, running headless {:?}", e);
                run(pod, moisture, temperature, power, radio, NoDisplay).await
            }
        }
    } else {
        run(pod, moisture, temperature, power, radio, NoDisplay).await
    }
}

async fn build_radio(r: Xcvr) -> Result<LoraLink, lora_soil_pod::error::Error> {
    let nss = Output::new(r.cs, Level::High);
    let reset = Output::new(r.rst, Level::High);
    let dio1 = Input::new(r.dio1, Pull::None);
    let busy = Input::new(r.busy, Pull::None);
    let spi = Spi::new(r.spi1, r.clk, r.mosi, r.miso, r.dma_ch0, r.dma_ch1, spi::Config::default());

    LoraLink::try_new(spi, nss, reset, dio1, busy).await
}

async fn run<D: DisplaySurface>(
    pod: PodIdentity,
    moisture: SoilProbes,
    temperature: Thermometer,
    power: PowerMonitor,
    radio: LoraLink,
    display: D,
) {
    let board = BoardBuilder::new()
        .with_moisture_sensor(moisture)
        .with_temperature_bus(temperature)
        .with_power_monitor(power)
        .with_radio(radio)
        .with_display(display)
        .with_delay(Delay)
        .build()
        .expect("all devices should be connected");

    let rng = SmallRng::seed_from_u64(pod.seed());
    let mut node = Node::new(board, ResetSleep, pod, NodeConfig::default(), rng);

    // only returns if the sleep did not reset the chip
    let report = node.run().await;
    error!("woke up without a reset after {:?}", report);
}
