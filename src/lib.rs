pub mod logging;
pub mod navigator;
pub mod render;
pub mod site;
pub mod theme;
