mod length;

pub use length::Length;
