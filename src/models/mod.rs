pub mod analysis;
pub mod enums;
pub mod reading;

pub use analysis::*;
pub use enums::*;
pub use reading::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid {field} value: {value:?}")]
    InvalidEnum { field: String, value: String },
}
