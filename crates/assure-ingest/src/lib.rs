pub mod csv;
pub mod value;

pub use csv::read_csv;
pub use value::{any_to_f64, any_to_string, format_numeric, is_missing, is_numeric_value};
