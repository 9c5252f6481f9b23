// Domain layer: spreadsheet and reconciliation models plus the ports the pipelines depend on.

pub mod model;
pub mod ports;
