#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

// must go first so the logging macros are visible in every module
mod fmt;

pub mod averager;
pub mod board;
pub mod classifier;
pub mod config;
pub mod display;
pub mod error;
pub mod lifecycle;
pub mod payload;
pub mod power;
pub mod radio;
pub mod receiver;
pub mod scheduler;
pub mod sensor;

#[cfg(feature = "rp2040")]
pub mod hw;

#[cfg(test)]
mod mock;
