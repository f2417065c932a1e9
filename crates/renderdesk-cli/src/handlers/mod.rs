pub mod frames;
pub mod maya;
pub mod nuke;
pub mod presets;
