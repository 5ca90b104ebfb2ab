pub mod bands;

pub use bands::*;
