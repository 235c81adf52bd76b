pub mod pvs6;
pub mod sheets;
