pub mod client;
pub mod error;
pub mod types;

pub use client::{Session, WebDriverClient, keys};
pub use error::DriverError;
pub use types::ElementRef;
