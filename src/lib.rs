//! Rust implementation of the NRRD (Nearly Raw Raster Data) file format.
//!
//! NRRD files hold a plain text header followed by the raw, ASCII or
//! compressed samples of an N-dimensional array. The header may also live
//! in a separate `.nhdr` file which names the file holding the data.
//!
//! # Example
//!
//! ```no_run
//! use nrrd::{InMemNrrdObject, IntoNdArray, NrrdObject, WriterOptions};
//! # use nrrd::Result;
//!
//! # fn run() -> Result<()> {
//! let obj = InMemNrrdObject::from_file("volume.nrrd")?;
//! let header = obj.header().clone();
//! let data = obj.into_volume().into_ndarray::<i16>()?;
//!
//! WriterOptions::new("copy.nhdr")
//!     .reference_header(&header)
//!     .write_nrrd(&data)?;
//! # Ok(())
//! # }
//! ```
#![recursion_limit = "256"]
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
mod util;

#[cfg(feature = "nalgebra_affine")]
pub mod affine;
pub mod error;
pub mod field;
pub mod formatter;
pub mod header;
pub mod object;
pub mod parser;
pub mod typedef;
pub mod value;
pub mod volume;
pub mod writer;

pub use byteordered::Endianness;
pub use error::{NrrdError, Result};
pub use field::{FieldMap, FieldType};
pub use header::NrrdHeader;
pub use object::{
    DuplicateFieldPolicy, InMemNrrdObject, NrrdObject, ReaderOptions, SpaceDirectionsRepr,
};
pub use typedef::{Encoding, IndexOrder, NrrdType};
pub use value::Value;
pub use volume::{DataElement, InMemNrrdVolume, IntoNdArray, NrrdVolume};
pub use writer::WriterOptions;
