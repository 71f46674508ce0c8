pub mod interval;

pub use interval::{ActiveInterval, Interval};
