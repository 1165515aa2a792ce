use embassy_time::Duration;

use crate::config::Config;

/// How long the pod sleeps after this wake cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepPlan {
    Tier1,
    Tier2,
    Tier3,
    /// Critical battery, sleep the longest tier without sensing or sending.
    ImmediateTier3,
}

impl SleepPlan {
    pub fn skips_cycle(&self) -> bool {
        matches!(self, SleepPlan::ImmediateTier3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerPolicy {
    pub low_voltage_2: f32,
    pub low_voltage_3: f32,
    pub tier_1: Duration,
    pub tier_2: Duration,
    pub tier_3: Duration,
}

impl Default for PowerPolicy {
    fn default() -> Self {
        Self {
            low_voltage_2: Config::BATTERY_LOW_VOLTAGE_2,
            low_voltage_3: Config::BATTERY_LOW_VOLTAGE_3,
            tier_1: Config::DEEP_SLEEP_TIER_1,
            tier_2: Config::DEEP_SLEEP_TIER_2,
            tier_3: Config::DEEP_SLEEP_TIER_3,
        }
    }
}

impl PowerPolicy {
    /// Picks the sleep tier from the boot-time battery voltage, first match wins.
    pub fn select_sleep(&self, voltage: f32) -> SleepPlan {
        if voltage <= self.low_voltage_3 {
            SleepPlan::ImmediateTier3
        } else if voltage <= self.low_voltage_2 {
            SleepPlan::Tier2
        } else {
            SleepPlan::Tier1
        }
    }

    pub fn duration(&self, plan: SleepPlan) -> Duration {
        match plan {
            SleepPlan::Tier1 => self.tier_1,
            SleepPlan::Tier2 => self.tier_2,
            SleepPlan::Tier3 | SleepPlan::ImmediateTier3 => self.tier_3,
        }
    }
}

/// Platform deep sleep. Waking up is a fresh boot, nothing survives the call.
pub trait DeepSleep {
    async fn enter(&mut self, duration: Duration);
}
