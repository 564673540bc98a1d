//! Ideal functionalities.

pub mod cot;
