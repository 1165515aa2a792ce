use embedded_hal_async::delay::DelayNs;
use rand_core::RngCore;

use crate::board::Board;
use crate::config::{NodeConfig, PodIdentity};
use crate::display::DisplaySurface;
use crate::power::{DeepSleep, SleepPlan};
use crate::radio::RadioLink;
use crate::scheduler::{TransmissionReport, TransmissionScheduler};
use crate::sensor::{Devices, MoistureSensor, PowerMonitor, TemperatureBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Booting,
    BatteryCheck,
    EarlySleep(SleepPlan),
    SensorInit(SleepPlan),
    Transmitting(SleepPlan),
    PoweringDown(SleepPlan),
    Sleeping(SleepPlan),
}

/// Outcome of one wake cycle, returned once the platform sleep call comes back
/// (it never does on hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub final_state: State,
    pub plan: SleepPlan,
    pub transmission: Option<TransmissionReport>,
}

/// One wake cycle of the pod, from boot to deep sleep.
pub struct Node<M, T, P, R, D, Dl, Z, Rn> {
    pub board: Board<M, T, P, R, D, Dl>,
    pub sleeper: Z,
    pod: PodIdentity,
    config: NodeConfig,
    scheduler: TransmissionScheduler<Rn>,
}

impl<M, T, P, R, D, Dl, Z, Rn> Node<M, T, P, R, D, Dl, Z, Rn>
where
    M: MoistureSensor,
    T: TemperatureBus,
    P: PowerMonitor,
    R: RadioLink,
    D: DisplaySurface,
    Dl: DelayNs,
    Z: DeepSleep,
    Rn: RngCore,
{
    pub fn new(board: Board<M, T, P, R, D, Dl>, sleeper: Z, pod: PodIdentity, config: NodeConfig, rng: Rn) -> Self {
        let scheduler = TransmissionScheduler::new(rng, config.retries, config.max_delay_ms);

        Self {
            board,
            sleeper,
            pod,
            config,
            scheduler,
        }
    }

    pub async fn run(&mut self) -> CycleReport {
        let mut state = State::Booting;
        let mut devices = Devices::new();
        let mut transmission = None;

        loop {
            debug!("lifecycle: {:?}", state);

            state = match state {
                State::Booting => {
                    info!("pod {} booting", self.pod.pod_id());
                    State::BatteryCheck
                }
                State::BatteryCheck => match self.battery_voltage().await {
                    Ok(voltage) => {
                        info!("battery level {} V", voltage);
                        let plan = self.config.policy.select_sleep(voltage);

                        if plan.skips_cycle() {
                            warn!("battery critical, skipping this cycle");
                            State::EarlySleep(plan)
                        } else {
                            State::SensorInit(plan)
                        }
                    }
                    Err(e) => {
                        error!("power monitor not responding: {:?}", e);
                        State::EarlySleep(SleepPlan::Tier3)
                    }
                },
                State::SensorInit(plan) => match self.init_sensors().await {
                    Ok(found) => {
                        info!("one-wire devices found: {}", found.len());
                        devices = found;
                        State::Transmitting(plan)
                    }
                    Err(e) => {
                        error!("sensor initialization failed: {:?}", e);
                        State::PoweringDown(SleepPlan::Tier3)
                    }
                },
                State::Transmitting(plan) => {
                    let report = self
                        .scheduler
                        .attempt_all(&mut self.board, &self.pod, &devices, self.config.readings)
                        .await;
                    info!("transmission done, {} of {} frames sent", report.sent, report.attempts);

                    transmission = Some(report);
                    State::PoweringDown(plan)
                }
                State::PoweringDown(plan) => {
                    info!("powering off sensors");
                    if let Err(e) = self.board.moisture.off().await {
                        error!("failed to power off moisture sensors: {:?}", e);
                    }
                    self.board.clear_display().await;

                    State::Sleeping(plan)
                }
                State::EarlySleep(plan) | State::Sleeping(plan) => {
                    // the battery check or an aborted burst can leave the monitor converting
                    if let Err(e) = self.board.power.sleep().await {
                        warn!("failed to power down the power monitor: {:?}", e);
                    }

                    let duration = self.config.policy.duration(plan);
                    info!("entering deep sleep [{} s]", duration.as_secs());
                    self.sleeper.enter(duration).await;

                    return CycleReport {
                        final_state: state,
                        plan,
                        transmission,
                    };
                }
            };
        }
    }

    async fn battery_voltage(&mut self) -> Result<f32, crate::error::Error> {
        // the monitor may still be powered down from the previous cycle
        self.board.power.wake().await?;
        self.board.power.voltage().await
    }

    async fn init_sensors(&mut self) -> Result<Devices, crate::error::Error> {
        self.board.moisture.on().await?;

        let devices = self.board.temperature.discover().await?;
        if devices.is_empty() {
            return Err(crate::error::Error::NoTemperatureProbe);
        }

        Ok(devices)
    }
}
