pub mod analysis;
pub mod tick;
