#![allow(dead_code)]

pub mod factory;
pub mod clock;
