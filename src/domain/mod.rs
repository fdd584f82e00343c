pub mod change;
pub mod pattern;
