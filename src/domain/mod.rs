// Domain layer: core models and ports (interfaces) shared by the classifier and the reaper.

pub mod model;
pub mod ports;
