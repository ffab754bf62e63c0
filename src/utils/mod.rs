pub mod errors;
pub mod surface;
pub mod table;
