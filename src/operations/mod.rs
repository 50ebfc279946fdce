pub mod creation;
pub mod fillet;
pub mod query;
pub mod shaping;
