pub mod image;
pub mod panels;
pub mod plot;
