use embassy_time::Duration;

use crate::error::Error;

/// Metadata of a packet pulled off the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketStatus {
    pub len: usize,
    pub rssi: i16,
}

// Trait to represent basic functionality of a point to point lora radio.
// Links are unacknowledged, a successful send only means the frame left the antenna.
pub trait RadioLink {
    // Transmit one frame, fire and forget
    async fn send(&mut self, payload: &[u8]) -> Result<(), Error>;

    // RSSI of the last received packet in dBm, informational only
    fn signal_strength(&self) -> i16;

    // Block until a packet arrives or the timeout expires, Ok(None) on timeout
    async fn receive(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<Option<PacketStatus>, Error>;
}
