pub mod consumption;
pub mod movement;
pub mod navigation;
