//! Background processes - the irrigation job and the passive drying ticker

mod drying;
mod irrigation;

pub use drying::DryingProcess;
pub use irrigation::IrrigationJob;
