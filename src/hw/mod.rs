//! RP2040 drivers behind the library traits. Construction of the embassy
//! peripherals happens in the binaries, these types only adapt them.

pub mod moisture;
pub mod oled;
pub mod onewire;
pub mod radio;
pub mod sleep;

pub use moisture::SoilProbes;
pub use oled::Oled;
pub use onewire::PioBus;
pub use radio::LoraLink;
pub use sleep::ResetSleep;
