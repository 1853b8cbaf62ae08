//! Board-support driver for the Cutebot two-wheeled robot extension board on no-std platforms.
//!
//! For a runnable simulation, see the `cutebot-app/mock-mcu` binary.
#![no_std]

pub mod utils;
