use embedded_hal_async::delay::DelayNs;
use rand::Rng;
use rand_core::RngCore;

use crate::board::Board;
use crate::config::PodIdentity;
use crate::display::DisplaySurface;
use crate::payload;
use crate::radio::RadioLink;
use crate::sensor::{MoistureSensor, OneWireAddress, PowerMonitor, TemperatureBus};

/// How a transmission is confirmed. Pods never listen for a reply, sending
/// every slot is what makes delivery likely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Acknowledgement {
    #[default]
    None,
}

/// What happened during the retry loop. `sent` counts frames handed to the
/// radio, not frames that arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmissionReport {
    pub acknowledgement: Acknowledgement,
    pub attempts: u8,
    pub sent: u8,
    pub failed_bursts: u8,
    pub failed_sends: u8,
    pub jitter_ms: u64,
}

/// Sends the same measurement `retries` times, each inside its own random slot
/// of the delay window.
///
/// There is no acknowledgement and no backoff: pods sharing the channel are
/// desynchronised by per-pod seeded jitter and redundancy stands in for acks.
pub struct TransmissionScheduler<Rn> {
    rng: Rn,
    retries: u8,
    max_delay_ms: u32,
}

impl<Rn: RngCore> TransmissionScheduler<Rn> {
    pub fn new(rng: Rn, retries: u8, max_delay_ms: u32) -> Self {
        Self {
            rng,
            retries,
            max_delay_ms: max_delay_ms.max(1),
        }
    }

    /// Uniform draw in `[1, max_delay_ms]`.
    pub fn draw_delay_ms(&mut self) -> u32 {
        self.rng.gen_range(1..=self.max_delay_ms)
    }

    pub async fn attempt_all<M, T, P, R, D, Dl>(
        &mut self,
        board: &mut Board<M, T, P, R, D, Dl>,
        pod: &PodIdentity,
        devices: &[OneWireAddress],
        readings: u8,
    ) -> TransmissionReport
    where
        M: MoistureSensor,
        T: TemperatureBus,
        P: PowerMonitor,
        R: RadioLink,
        D: DisplaySurface,
        Dl: DelayNs,
    {
        let mut report = TransmissionReport::default();

        for slot in 0..self.retries {
            info!("preparing time slot {}", slot);

            let delay_ms = self.draw_delay_ms();
            board.delay.delay_ms(delay_ms).await;
            report.jitter_ms += delay_ms as u64;
            report.attempts += 1;

            info!("starting after {} ms", delay_ms);

            let reading = match board.run_burst(devices, readings).await {
                Ok(reading) => reading,
                Err(e) => {
                    warn!("slot {}: sensor burst failed, nothing sent: {:?}", slot, e);
                    report.failed_bursts += 1;
                    continue;
                }
            };

            let payload = match payload::encode(pod, &reading) {
                Ok(payload) => payload,
                Err(e) => {
                    error!("slot {}: failed to encode payload: {:?}", slot, e);
                    report.failed_bursts += 1;
                    continue;
                }
            };

            board.show_status(pod, &reading).await;

            match board.uplink(&payload).await {
                Ok(()) => report.sent += 1,
                Err(_) => report.failed_sends += 1,
            }
        }

        report
    }
}
