pub mod lcd;
pub mod segments;

pub use lcd::BlinkRate;
