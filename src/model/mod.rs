pub mod board;
pub mod device;
pub mod graphics;
pub mod layer;
pub mod net;
pub mod pathgen;
pub mod plane;
pub mod transform;
