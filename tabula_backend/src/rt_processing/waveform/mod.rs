pub mod oscillators;
pub mod tables;

pub use oscillators::TableOscillator;
