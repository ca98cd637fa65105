// Domain layer: entities, the upstream parsing boundary, and the ports the adapters implement.

pub mod model;
pub mod normalize;
pub mod ports;
