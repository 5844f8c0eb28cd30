//! Output formatters for catalog listings.
//!
//! - Text for terminals
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use loracat::catalog::CatalogManager;
//! use loracat::output::json::JsonOutput;
//!
//! let mut manager = CatalogManager::open("/srv/lora_models").unwrap();
//! let (records, summary) = manager.scan_with_summary(false).unwrap();
//!
//! let output = JsonOutput::new(&records);
//! println!("{}", output.to_json_pretty().unwrap());
//! # let _ = summary;
//! ```

pub mod csv;
pub mod json;
pub mod text;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
