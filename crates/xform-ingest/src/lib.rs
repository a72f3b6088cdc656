//! XLSForm ingestion: the table reader and schema loader collaborators.

pub mod schema_loader;
pub mod sheet;

pub use schema_loader::{build_form_schema, load_form_schema};
pub use sheet::read_sheet_grid;
