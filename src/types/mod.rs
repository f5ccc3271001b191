pub mod coordinate;
pub mod records;
