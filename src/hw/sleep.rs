use embassy_time::{Duration, Timer};

use crate::power::DeepSleep;

/// Waits out the sleep period and resets the chip, so every wake cycle
/// starts from a cold boot.
pub struct ResetSleep;

impl DeepSleep for ResetSleep {
    async fn enter(&mut self, duration: Duration) {
        Timer::after(duration).await;
        cortex_m::peripheral::SCB::sys_reset();
    }
}
