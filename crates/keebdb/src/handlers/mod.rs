pub mod error;
pub mod health;
pub mod keyboards;

pub use error::AppError;
