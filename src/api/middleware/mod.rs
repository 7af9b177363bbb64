pub mod error_boundary;

pub use error_boundary::error_boundary;
