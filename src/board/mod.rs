use crate::{
    averager::AveragedReading,
    config::PodIdentity,
    display::{self, DisplaySurface},
    error::Error,
    radio::RadioLink,
};

/// Everything the pod talks to during a wake cycle. Built once at boot and
/// handed down by reference, there is no global hardware state.
pub struct Board<M, T, P, R, D, Dl> {
    pub moisture: M,
    pub temperature: T,
    pub power: P,
    pub radio: R,
    pub display: D,
    pub delay: Dl,
}

pub struct BoardBuilder<M, T, P, R, D, Dl> {
    moisture: Option<M>,
    temperature: Option<T>,
    power: Option<P>,
    radio: Option<R>,
    display: Option<D>,
    delay: Option<Dl>,
}

impl<M, T, P, R, D, Dl> Board<M, T, P, R, D, Dl>
where
    R: RadioLink,
{
    /// Transmit one payload. The link has no acknowledgement, an error here only
    /// means the radio refused the frame.
    pub async fn uplink(&mut self, payload: &str) -> Result<(), Error> {
        info!("sending payload {}", payload);

        match self.radio.send(payload.as_bytes()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("failed to send payload: {:?}", e);
                Err(e)
            }
        }
    }
}

impl<M, T, P, R, D, Dl> Board<M, T, P, R, D, Dl>
where
    R: RadioLink,
    D: DisplaySurface,
{
    /// Best effort, a broken screen never stops a transmission.
    pub async fn show_status(&mut self, pod: &PodIdentity, reading: &AveragedReading) {
        let rssi = self.radio.signal_strength();
        let result = match display::pod_status(pod, reading, rssi) {
            Ok(lines) => match display::draw_lines(&mut self.display, &lines).await {
                Ok(()) => self.display.show().await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!("display: failed to draw status {:?}", e);
        }
    }

    pub async fn clear_display(&mut self) {
        let result = match self.display.clear().await {
            Ok(()) => self.display.show().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!("display: failed to clear {:?}", e);
        }
    }
}

impl<M, T, P, R, D, Dl> BoardBuilder<M, T, P, R, D, Dl> {
    pub fn new() -> Self {
        BoardBuilder {
            moisture: None,
            temperature: None,
            power: None,
            radio: None,
            display: None,
            delay: None,
        }
    }

    pub fn with_moisture_sensor(mut self, moisture: M) -> Self {
        self.moisture = Some(moisture);
        self
    }

    pub fn with_temperature_bus(mut self, temperature: T) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_power_monitor(mut self, power: P) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_radio(mut self, radio: R) -> Self {
        self.radio = Some(radio);
        self
    }

    pub fn with_display(mut self, display: D) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_delay(mut self, delay: Dl) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn build(self) -> Result<Board<M, T, P, R, D, Dl>, Error> {
        if let (Some(moisture), Some(temperature), Some(power), Some(radio), Some(display), Some(delay)) =
            (self.moisture, self.temperature, self.power, self.radio, self.display, self.delay)
        {
            Ok(Board {
                moisture,
                temperature,
                power,
                radio,
                display,
                delay,
            })
        } else {
            Err(Error::FailedToInitialize)
        }
    }
}

impl<M, T, P, R, D, Dl> Default for BoardBuilder<M, T, P, R, D, Dl> {
    fn default() -> Self {
        Self::new()
    }
}
