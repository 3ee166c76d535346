pub mod price;
pub mod vehicle;

pub use price::*;
pub use vehicle::*;
