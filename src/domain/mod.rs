// Domain layer: request/response models and provider ports. No HTTP here.

pub mod model;
pub mod ports;
