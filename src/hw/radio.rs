use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Duration, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use lora_phy::iv::GenericSx126xInterfaceVariant;
use lora_phy::mod_params::{Bandwidth, CodingRate, ModulationParams, RxMode, SpreadingFactor};
use lora_phy::sx126x::{self, Sx1262, Sx126x, TcxoCtrlVoltage};
use lora_phy::LoRa;

use crate::config::Config;
use crate::error::Error;
use crate::radio::{PacketStatus, RadioLink};

type SX1262 = Sx126x<
    ExclusiveDevice<Spi<'static, SPI1, spi::Async>, Output<'static>, Delay>,
    GenericSx126xInterfaceVariant<Output<'static>, Input<'static>>,
    Sx1262,
>;

/// SX1262 in plain LoRa mode, no LoRaWAN stack on top.
pub struct LoraLink {
    lora: LoRa<SX1262, Delay>,
    modulation: ModulationParams,
    rssi: i16,
}

impl LoraLink {
    pub async fn try_new(
        spi: Spi<'static, SPI1, spi::Async>,
        nss: Output<'static>,
        reset: Output<'static>,
        dio1: Input<'static>,
        busy: Input<'static>,
    ) -> Result<Self, Error> {
        let spi_bus = ExclusiveDevice::new(spi, nss, Delay);
        let sx1262_config = sx126x::Config {
            chip: Sx1262,
            tcxo_ctrl: Some(TcxoCtrlVoltage::Ctrl1V7),
            use_dcdc: true,
            rx_boost: false,
        };

        let iv = GenericSx126xInterfaceVariant::new(reset, dio1, busy, None, None)?;
        // private sync word, pods and receiver are not part of a public network
        let mut lora = LoRa::new(Sx126x::new(spi_bus, iv, sx1262_config), false, Delay).await?;
        let modulation = lora.create_modulation_params(
            SpreadingFactor::_7,
            Bandwidth::_125KHz,
            CodingRate::_4_5,
            Config::LORA_FREQUENCY_HZ,
        )?;

        Ok(Self {
            lora,
            modulation,
            rssi: 0,
        })
    }
}

impl RadioLink for LoraLink {
    async fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        let mut params =
            self.lora
                .create_tx_packet_params(Config::LORA_PREAMBLE_LENGTH, false, true, false, &self.modulation)?;

        self.lora
            .prepare_for_tx(&self.modulation, &mut params, Config::LORA_TX_POWER_DBM, payload)
            .await?;
        self.lora.tx().await?;
        self.lora.sleep(false).await?;

        Ok(())
    }

    fn signal_strength(&self) -> i16 {
        self.rssi
    }

    async fn receive(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<Option<PacketStatus>, Error> {
        let max_len = buffer.len().min(u8::MAX as usize) as u8;
        let params = self.lora.create_rx_packet_params(
            Config::LORA_PREAMBLE_LENGTH,
            false,
            max_len,
            true,
            false,
            &self.modulation,
        )?;

        self.lora
            .prepare_for_rx(RxMode::Continuous, &self.modulation, &params)
            .await?;

        match select(self.lora.rx(&params, buffer), Timer::after(timeout)).await {
            Either::First(result) => {
                let (len, status) = result?;
                self.rssi = status.rssi;

                Ok(Some(PacketStatus {
                    len: len as usize,
                    rssi: status.rssi,
                }))
            }
            Either::Second(()) => Ok(None),
        }
    }
}
