//! Utility functions to write NRRD files.

use crate::error::{NrrdError, Result};
use crate::field::FieldMap;
use crate::header::{write_header, NrrdHeader};
use crate::typedef::{endian_str, Encoding, IndexOrder, NrrdType};
use crate::util::{absolute_path, is_detached_header_path, is_nrrd_path};
use crate::value::Value;
use crate::volume::codec::{ascii_row_len, encode_raw_bytes, encode_samples, EncodeParams};
use crate::volume::element::DataElement;
use crate::volume::{InMemNrrdVolume, NrrdVolume};
use byteordered::Endianness;
use log::debug;
use ndarray::{ArrayBase, Data, Dimension};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Fields describing where the data starts, which never carry over from a
/// reference header since the data is always written right away.
const SKIP_FIELDS: &[&str] = &["line skip", "lineskip", "byte skip", "byteskip"];

const DATA_FILE_FIELDS: &[&str] = &["data file", "datafile"];

/// Options and flags which can be used to configure how a NRRD file is
/// written.
///
/// The encoding is taken from the reference header's `encoding` field,
/// defaulting to gzip. The fields describing the data (`type`,
/// `dimension`, `sizes`, `endian` and `block size`) are always derived from
/// the data being written.
///
/// # Example
///
/// ```no_run
/// use ndarray::Array3;
/// use nrrd::{NrrdHeader, WriterOptions};
/// # use nrrd::Result;
///
/// # fn run() -> Result<()> {
/// let data = Array3::<u16>::zeros((30, 30, 30));
/// let header = NrrdHeader::new().with_field("encoding", "raw");
/// WriterOptions::new("volume.nhdr")
///     .reference_header(&header)
///     .write_nrrd(&data)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions<'a> {
    /// Where to write the output.
    path: PathBuf,
    /// Header to take the fields from, if any.
    header_reference: Option<&'a NrrdHeader>,
    /// Types of custom fields, for formatting their values.
    custom_fields: FieldMap,
    /// Whether to write the data to a separate file.
    detached_header: bool,
    /// Whether the `data file` field holds a path relative to the header.
    relative_data_path: bool,
    /// Compression level of compressed encodings, from 1 to 9.
    compression_level: u32,
    /// Axis order of the arrays given to the writer.
    index_order: IndexOrder,
    /// Byte order of binary multi-byte elements.
    endianness: Endianness,
    /// Whether to write the comment lines naming the generator.
    preamble: bool,
}

impl<'a> WriterOptions<'a> {
    /// Creates a new set of options to write a NRRD file at `path`.
    ///
    /// A path ending in `.nhdr` writes a detached header, next to a data
    /// file named after it.
    pub fn new<P: AsRef<Path>>(path: P) -> WriterOptions<'a> {
        WriterOptions {
            path: path.as_ref().to_path_buf(),
            header_reference: None,
            custom_fields: FieldMap::new(),
            detached_header: false,
            relative_data_path: true,
            compression_level: 9,
            index_order: IndexOrder::Fortran,
            endianness: Endianness::native(),
            preamble: true,
        }
    }

    /// Sets a header to be used as a reference for the written file.
    pub fn reference_header(mut self, header: &'a NrrdHeader) -> Self {
        self.header_reference = Some(header);
        self
    }

    /// Sets the types of custom fields, which decide how their values are
    /// formatted.
    pub fn custom_fields(mut self, custom_fields: FieldMap) -> Self {
        self.custom_fields = custom_fields;
        self
    }

    /// Whether to write the data to a separate file when the output path
    /// ends in `.nrrd`. The header is then written next to it with the
    /// `.nhdr` extension. Output paths ending in `.nhdr` are always
    /// detached.
    pub fn detached_header(mut self, detached_header: bool) -> Self {
        self.detached_header = detached_header;
        self
    }

    /// Whether the `data file` field of a detached header holds the file
    /// name of the data file (the default) or its absolute path.
    pub fn relative_data_path(mut self, relative_data_path: bool) -> Self {
        self.relative_data_path = relative_data_path;
        self
    }

    /// Sets the compression level of gzip and bzip2 encoded data. Levels
    /// are clamped to the range from 1 (fastest) to 9 (smallest, the
    /// default).
    pub fn compression_level(mut self, compression_level: u32) -> Self {
        self.compression_level = compression_level.max(1).min(9);
        self
    }

    /// Sets the axis order of the arrays given to the writer. With
    /// `IndexOrder::C`, the last array axis becomes the first axis of
    /// `sizes`.
    pub fn index_order(mut self, index_order: IndexOrder) -> Self {
        self.index_order = index_order;
        self
    }

    /// Sets the byte order of written binary data. Defaults to the
    /// system's byte order.
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Whether to write the comment lines naming the generator of the file
    /// after the magic line. Enabled by default.
    pub fn preamble(mut self, preamble: bool) -> Self {
        self.preamble = preamble;
        self
    }

    /// Write an array to a NRRD file. Returns the header which was
    /// written.
    pub fn write_nrrd<A, S, D>(&self, data: &ArrayBase<S, D>) -> Result<NrrdHeader>
    where
        S: Data<Elem = A>,
        A: DataElement,
        D: Dimension,
    {
        let view = data.view().into_dyn();
        let view = match self.index_order {
            IndexOrder::Fortran => view,
            IndexOrder::C => view.reversed_axes(),
        };
        let sizes = view.shape().to_vec();
        let item_size = std::mem::size_of::<A>();
        let (header, params) = self.prepare_header(A::DATA_TYPE, item_size, &sizes)?;

        // iterating the reversed axes in logical order visits the first
        // axis of `sizes` fastest
        let samples = view.reversed_axes();
        self.write_files(header, params.encoding, |w| {
            encode_samples(w, samples.iter().copied(), &params)
        })
    }

    /// Write a volume to a NRRD file. Returns the header which was written.
    pub fn write_volume(&self, volume: &InMemNrrdVolume) -> Result<NrrdHeader> {
        let datatype = volume.data_type();
        let (header, params) = self.prepare_header(datatype, volume.item_size(), volume.sizes())?;

        if params.encoding == Encoding::Ascii {
            let raw = volume.raw_data().to_vec();
            let e = volume.endianness();
            return with_element_type!(datatype,
                T => self.write_files(header, params.encoding, |w| {
                    encode_samples(w, T::from_raw_vec(raw, e), &params)
                }),
                Block => Err(NrrdError::UnsupportedDataType(NrrdType::Block)));
        }

        let swap = datatype != NrrdType::Block && volume.endianness() != params.endianness;
        self.write_files(header, params.encoding, |w| {
            encode_raw_bytes(w, volume.raw_data(), volume.item_size(), swap, &params)
        })
    }

    /// Build the header to write, out of the reference header and the
    /// description of the data.
    fn prepare_header(
        &self,
        datatype: NrrdType,
        item_size: usize,
        sizes: &[usize],
    ) -> Result<(NrrdHeader, EncodeParams)> {
        let mut header = self.header_reference.cloned().unwrap_or_default();

        let encoding = match header.get("encoding") {
            None => Encoding::Gzip,
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| NrrdError::InvalidWriteEncoding(s.clone()))?,
            Some(other) => return Err(NrrdError::InvalidWriteEncoding(other.to_string())),
        };
        if datatype == NrrdType::Block && encoding == Encoding::Ascii {
            return Err(NrrdError::UnsupportedDataType(NrrdType::Block));
        }

        let _ = header.insert("type", datatype.as_str());
        let _ = header.insert("dimension", sizes.len() as i64);
        let _ = header.insert(
            "sizes",
            Value::IntList(sizes.iter().map(|&s| s as i64).collect()),
        );
        let _ = header.insert("encoding", encoding.as_str());

        let _ = header.remove("blocksize");
        if datatype == NrrdType::Block {
            let _ = header.insert("block size", item_size as i64);
        } else {
            let _ = header.remove("block size");
        }

        if item_size > 1 && encoding.is_binary() && datatype != NrrdType::Block {
            let _ = header.insert("endian", endian_str(self.endianness));
        } else {
            let _ = header.remove("endian");
        }

        if header.contains("space") {
            let _ = header.remove("space dimension");
        }
        for field in SKIP_FIELDS {
            let _ = header.remove(field);
        }

        let params = EncodeParams {
            encoding,
            endianness: self.endianness,
            compression_level: self.compression_level,
            row_len: ascii_row_len(sizes),
        };
        Ok((header, params))
    }

    /// Resolve where the header and the data go. Returns the header path
    /// and, for detached headers, the data file path.
    fn resolve_paths(
        &self,
        header: &mut NrrdHeader,
        encoding: Encoding,
    ) -> Result<(PathBuf, Option<PathBuf>)> {
        if is_detached_header_path(&self.path) {
            // the data file name always follows the header name
            let data_path = self.path.with_extension(encoding.data_file_extension());
            self.set_data_file(header, &data_path)?;
            Ok((self.path.clone(), Some(data_path)))
        } else if self.detached_header && is_nrrd_path(&self.path) {
            self.set_data_file(header, &self.path)?;
            Ok((self.path.with_extension("nhdr"), Some(self.path.clone())))
        } else {
            for field in DATA_FILE_FIELDS {
                let _ = header.remove(field);
            }
            Ok((self.path.clone(), None))
        }
    }

    fn set_data_file(&self, header: &mut NrrdHeader, data_path: &Path) -> Result<()> {
        let reference = if self.relative_data_path {
            data_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| data_path.to_path_buf())
        } else {
            absolute_path(data_path)?
        };
        let _ = header.remove("datafile");
        let _ = header.insert("data file", reference.to_string_lossy().into_owned());
        Ok(())
    }

    /// Write the header and the data, either to one file or to a detached
    /// header and data file pair.
    fn write_files<F>(
        &self,
        mut header: NrrdHeader,
        encoding: Encoding,
        write_data: F,
    ) -> Result<NrrdHeader>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let (header_path, data_path) = self.resolve_paths(&mut header, encoding)?;

        let mut writer = BufWriter::new(File::create(&header_path)?);
        write_header(&mut writer, &header, &self.custom_fields, self.preamble)?;
        match data_path {
            Some(data_path) => {
                writer.flush()?;
                debug!(
                    "Writing detached header {} and data file {}",
                    header_path.display(),
                    data_path.display()
                );
                let mut data_writer = BufWriter::new(File::create(&data_path)?);
                write_data(&mut data_writer)?;
                data_writer.flush()?;
            }
            None => {
                debug!("Writing NRRD file {}", header_path.display());
                write_data(&mut writer)?;
                writer.flush()?;
            }
        }
        Ok(header)
    }
}
