pub mod eta_pipeline;
pub mod etl;
pub mod shipment_pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{CheckReport, EtaReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
