pub mod animation;
pub mod canvas;
pub mod frame;
pub mod video;
