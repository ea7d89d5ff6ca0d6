#![no_std]

pub mod map;
pub mod plane;
pub mod scroll;
pub mod tile;
pub mod transfer;

#[cfg(test)]
#[macro_use]
extern crate std;
