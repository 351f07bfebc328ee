pub mod panels;
pub mod plot;
pub mod tables;
pub mod views;
