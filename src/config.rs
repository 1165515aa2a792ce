use embassy_time::Duration;

use crate::error::Error;
use crate::power::PowerPolicy;

pub struct Config;

impl Config {
    pub const POD_ID: &'static str = "5";
    // same as the pod number, so every pod draws its own jitter sequence
    pub const SEED: u64 = 5;

    pub const RETRIES: u8 = 3;
    pub const MAX_DELAY_MS: u32 = 10_000;
    pub const N_READINGS: u8 = 5;

    pub const DEEP_SLEEP_TIER_1: Duration = Duration::from_secs(4 * 60 * 60);
    pub const DEEP_SLEEP_TIER_2: Duration = Duration::from_secs(24 * 60 * 60);
    pub const DEEP_SLEEP_TIER_3: Duration = Duration::from_secs(48 * 60 * 60);

    pub const BATTERY_LOW_VOLTAGE_2: f32 = 3.7;
    pub const BATTERY_LOW_VOLTAGE_3: f32 = 3.6;

    /// DS18B20 conversion time at 12 bit resolution.
    pub const TEMPERATURE_CONVERSION_MS: u32 = 750;
    /// One INA219 shunt + bus conversion at 12 bit.
    pub const POWER_MONITOR_WAKE_US: u32 = 1_100;

    pub const OLED_ON: bool = false;

    pub const I2C_ADDR_POWER_MONITOR: u8 = 0x40;
    pub const POWER_MONITOR_SHUNT_OHMS: f32 = 0.1;

    pub const LORA_FREQUENCY_HZ: u32 = 868_100_000;
    pub const LORA_TX_POWER_DBM: i32 = 14;
    pub const LORA_PREAMBLE_LENGTH: u16 = 8;
    pub const RECEIVER_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Who this pod is on the air. The id travels as the first payload field, so it
/// is restricted to a short alphanumeric token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PodIdentity {
    pod_id: &'static str,
    seed: u64,
}

impl PodIdentity {
    pub const MAX_ID_LEN: usize = 8;

    pub fn new(pod_id: &'static str, seed: u64) -> Result<Self, Error> {
        let valid = !pod_id.is_empty() && pod_id.len() <= Self::MAX_ID_LEN && pod_id.bytes().all(|b| b.is_ascii_alphanumeric());

        if valid {
            Ok(Self { pod_id, seed })
        } else {
            Err(Error::InvalidPodId)
        }
    }

    pub fn pod_id(&self) -> &'static str {
        self.pod_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Boot-time knobs of a wake cycle.
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    pub retries: u8,
    pub max_delay_ms: u32,
    pub readings: u8,
    pub policy: PowerPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            retries: Config::RETRIES,
            max_delay_ms: Config::MAX_DELAY_MS,
            readings: Config::N_READINGS,
            policy: PowerPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_id_must_be_a_short_token() {
        assert!(PodIdentity::new("5", 5).is_ok());
        assert!(PodIdentity::new("pod42", 42).is_ok());
        assert_eq!(PodIdentity::new("", 1), Err(Error::InvalidPodId));
        assert_eq!(PodIdentity::new("5,6", 1), Err(Error::InvalidPodId));
        assert_eq!(PodIdentity::new("toolongid", 1), Err(Error::InvalidPodId));
    }
}
