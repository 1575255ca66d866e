//! # polabels
//!
//! Turns a purchase-order spreadsheet export into printable adhesive labels.
//! This library provides:
//!
//! - **Ingestion**: read the first sheet of an `.xlsx`/`.xls` upload
//! - **Validation**: check the required columns, drop empty rows, normalize the delivery date
//! - **Pagination**: pack labels into 2 × 7 A4 pages or rows of 1–3 labels
//! - **Rendering**: an HTML sheet for browser printing or a PDF label table
//! - **Delivery**: fixed file names, content types and base64 download links
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use polabels::pipeline;
//! use polabels::schema::LabelSchema;
//!
//! let upload = std::fs::read("orders.xlsx").expect("read upload");
//! let artifact = pipeline::html_labels(&upload, &LabelSchema::html_labels())
//!     .expect("failed to build labels");
//! artifact.write_to(".").expect("failed to write labels.html");
//! ```
//!
//! ### PDF labels, three per row
//!
//! ```rust,no_run
//! use polabels::layout::LabelsPerRow;
//! use polabels::{pipeline, schema::LabelSchema};
//!
//! let per_row = LabelsPerRow::new(3).expect("1..=3");
//! let artifact = pipeline::pdf_labels_from_path("orders.xlsx", &LabelSchema::pdf_labels(), per_row)
//!     .expect("failed to build labels");
//! assert_eq!(artifact.file_name, "material_labels.pdf");
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: required columns, row filter and label template as configuration
//! - [`ingest`]: spreadsheet reading into a [`ingest::SourceTable`]
//! - [`normalize`]: validation and date normalization
//! - [`label`]: label text assembly
//! - [`layout`]: pagination into pages and rows
//! - [`html_renderer`]: HTML label sheet
//! - [`pdf_generator`] and [`table_renderer`]: PDF label table
//! - [`delivery`]: output artifacts
//! - [`pipeline`]: end-to-end runs

pub mod delivery;
pub mod error;
pub mod html_renderer;
pub mod ingest;
pub mod label;
pub mod layout;
pub mod normalize;
pub mod pdf_generator;
pub mod pipeline;
pub mod schema;
pub mod table_renderer;

pub use error::{LabelError, Result};
