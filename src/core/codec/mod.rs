//! Codec for the NFS-Ganesha configuration language.
//!
//! Converts between configuration text such as
//!
//! ```text
//! EXPORT {
//!     Export_Id = 101;
//!     Path = /exports/share1;
//!     CLIENT { Clients = 10.0.0.5; }
//! }
//! ```
//!
//! and a [`ConfigDocument`], and provides the [`patch`] merge used to layer
//! templates and overrides.
//!
//! # Modules
//!
//! - [`lexer`] - character level state machine producing tokens
//! - [`parser`] - token stream to document (with a JSON short-circuit)
//! - [`writer`] - document to text
//! - [`patch`] - recursive merge
//! - [`document`] - the document type and lookup helpers
//!
//! # Example
//!
//! ```rust
//! use ganesha_exports::core::codec::{parse, serialize};
//!
//! # fn example() -> ganesha_exports::domain::Result<()> {
//! let doc = parse("EXPORT { Path = /exports/share1; }")?;
//! assert_eq!(parse(&serialize(&doc))?, doc);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod lexer;
pub mod parser;
pub mod patch;
pub mod writer;

pub use document::{actual_key, get_ci, get_ci_mut, lookup, walk, ConfigDocument};
pub use parser::parse;
pub use patch::{merge, patch};
pub use writer::serialize;
