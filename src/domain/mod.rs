// Domain layer: record model, canonical form schemas and ports.

pub mod forms;
pub mod model;
pub mod ports;
