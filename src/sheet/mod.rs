// Spreadsheet access: workbook loading, header detection and column mapping.

pub mod columns;
pub mod header;
pub mod workbook;
