pub mod parser;
pub mod sheet;

pub use parser::parse_rows;
pub use sheet::{CsvFileStore, HttpSheetStore, RawRow, SheetClient, SheetStore};
