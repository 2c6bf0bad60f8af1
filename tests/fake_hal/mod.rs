#![allow(dead_code)]

mod concurrent;
pub mod digital;
pub mod line;
