//! Decoding and encoding of the data section of a NRRD file.
//!
//! Data is moved in bounded chunks, so that compressed streams of any size
//! can be decoded without holding more than the decoded samples in memory.

use crate::error::{NrrdError, Result};
use crate::header::NrrdHeader;
use crate::typedef::{parse_endian, Encoding, NrrdType};
use crate::volume::element::DataElement;
use byteordered::Endianness;
use bzip2::bufread::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use log::{debug, trace};
use std::io::{self, BufRead, Read, Write};

/// Size of the chunks in which data is decompressed and written.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Everything the header says about how the data section is laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    /// Element type.
    pub datatype: NrrdType,
    /// Size of one element in bytes.
    pub item_size: usize,
    /// Axis sizes, fastest axis first.
    pub sizes: Vec<usize>,
    /// Data encoding.
    pub encoding: Encoding,
    /// Byte order of binary multi-byte elements.
    pub endianness: Endianness,
    /// Lines to skip before the data, prior to decompression.
    pub line_skip: usize,
    /// Bytes to skip before the data, after decompression. `-1` means the
    /// data is found at the end of the stream.
    pub byte_skip: i64,
    /// Detached data file, as written in the header.
    pub data_file: Option<String>,
}

impl DataLayout {
    /// Resolve the data layout out of a header.
    ///
    /// # Errors
    ///
    /// - `NrrdError::MissingField` if `dimension`, `type`, `encoding` or
    ///   `sizes` is missing, or if `endian` is missing for binary data of
    ///   multi-byte elements.
    /// - `NrrdError::DimensionMismatch` if `dimension` and `sizes` disagree.
    /// - `NrrdError::InvalidLineSkip` and `NrrdError::InvalidByteSkip` on
    ///   out of range skips.
    pub fn from_header(header: &NrrdHeader) -> Result<Self> {
        for field in &["dimension", "type", "encoding", "sizes"] {
            let _ = header.required(field)?;
        }

        let dimension = header
            .int_field(&["dimension"])?
            .ok_or_else(|| NrrdError::MissingField("dimension".to_string()))?;
        let sizes = header
            .required("sizes")?
            .as_int_slice()
            .ok_or_else(|| {
                NrrdError::UnexpectedFieldValue("sizes".to_string(), "a list of integers")
            })?;
        if dimension < 0 || dimension as usize != sizes.len() {
            return Err(NrrdError::DimensionMismatch(dimension, sizes.len()));
        }
        let sizes = sizes
            .iter()
            .map(|&s| {
                if s < 0 {
                    Err(NrrdError::InvalidSize(s))
                } else {
                    Ok(s as usize)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let datatype: NrrdType = header
            .str_field(&["type"])?
            .ok_or_else(|| NrrdError::MissingField("type".to_string()))?
            .parse()?;
        let item_size = match datatype.size_of() {
            Some(size) => size,
            None => {
                let size = header
                    .int_field(&["block size", "blocksize"])?
                    .ok_or_else(|| NrrdError::MissingField("block size".to_string()))?;
                if size <= 0 {
                    return Err(NrrdError::InvalidBlockSize(size));
                }
                size as usize
            }
        };
        if sizes
            .iter()
            .try_fold(item_size, |acc, &s| acc.checked_mul(s))
            .is_none()
        {
            let largest = sizes.iter().copied().max().unwrap_or(0);
            return Err(NrrdError::InvalidSize(largest as i64));
        }

        let encoding: Encoding = header
            .str_field(&["encoding"])?
            .ok_or_else(|| NrrdError::MissingField("encoding".to_string()))?
            .parse()?;

        let endianness = if item_size > 1 && encoding.is_binary() && datatype != NrrdType::Block {
            let endian = header
                .str_field(&["endian"])?
                .ok_or_else(|| NrrdError::MissingField("endian".to_string()))?;
            parse_endian(endian)?
        } else {
            Endianness::native()
        };

        let line_skip = header.int_field(&["lineskip", "line skip"])?.unwrap_or(0);
        if line_skip < 0 {
            return Err(NrrdError::InvalidLineSkip(line_skip));
        }
        let byte_skip = header.int_field(&["byteskip", "byte skip"])?.unwrap_or(0);
        if byte_skip < -1 {
            return Err(NrrdError::InvalidByteSkip(byte_skip));
        }

        let data_file = header
            .str_field(&["datafile", "data file"])?
            .map(String::from);

        Ok(DataLayout {
            datatype,
            item_size,
            sizes,
            encoding,
            endianness,
            line_skip: line_skip as usize,
            byte_skip,
            data_file,
        })
    }

    /// The total number of elements.
    pub fn element_count(&self) -> usize {
        self.sizes.iter().product()
    }

    /// The total number of bytes of decoded data.
    pub fn byte_count(&self) -> usize {
        self.element_count() * self.item_size
    }
}

/// Decode the data section from a source positioned at its start, which
/// is right after the header for attached data, or the start of the data
/// file otherwise.
///
/// Returns the raw element bytes and their byte order. ASCII data is
/// returned in native byte order.
pub fn decode<R: BufRead>(mut source: R, layout: &DataLayout) -> Result<(Vec<u8>, Endianness)> {
    debug!(
        "Decoding {} {} elements ({} encoding)",
        layout.element_count(),
        layout.datatype,
        layout.encoding
    );

    match layout.encoding {
        // raw data at the end of the stream: line skip does not apply
        Encoding::Raw if layout.byte_skip == -1 => {
            Ok((read_tail(source, layout)?, layout.endianness))
        }
        Encoding::Raw => {
            skip_lines(&mut source, layout.line_skip)?;
            skip_bytes(&mut source, layout.byte_skip as u64)?;
            Ok((read_exactly(source, layout)?, layout.endianness))
        }
        Encoding::Gzip => {
            skip_lines(&mut source, layout.line_skip)?;
            let data = decode_compressed(GzDecoder::new(source), layout)?;
            Ok((data, layout.endianness))
        }
        Encoding::Bzip2 => {
            skip_lines(&mut source, layout.line_skip)?;
            let data = decode_compressed(BzDecoder::new(source), layout)?;
            Ok((data, layout.endianness))
        }
        Encoding::Ascii => {
            if layout.datatype == NrrdType::Block {
                return Err(NrrdError::UnsupportedDataType(NrrdType::Block));
            }
            if layout.byte_skip == -1 {
                return Err(NrrdError::InvalidByteSkip(-1));
            }
            skip_lines(&mut source, layout.line_skip)?;
            skip_bytes(&mut source, layout.byte_skip as u64)?;
            Ok((decode_ascii(source, layout)?, Endianness::native()))
        }
    }
}

fn skip_lines<R: BufRead>(source: &mut R, count: usize) -> io::Result<()> {
    for _ in 0..count {
        loop {
            let (found, used) = {
                let buf = source.fill_buf()?;
                if buf.is_empty() {
                    return Ok(());
                }
                match buf.iter().position(|&b| b == b'\n') {
                    Some(i) => (true, i + 1),
                    None => (false, buf.len()),
                }
            };
            source.consume(used);
            if found {
                break;
            }
        }
    }
    Ok(())
}

fn skip_bytes<R: Read>(source: &mut R, count: u64) -> io::Result<()> {
    if count > 0 {
        let skipped = io::copy(&mut source.take(count), &mut io::sink())?;
        trace!("Skipped {} bytes before the data", skipped);
    }
    Ok(())
}

fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            r => return r,
        }
    }
}

/// Read exactly the bytes of the data, in bounded chunks.
fn read_exactly<R: Read>(mut source: R, layout: &DataLayout) -> Result<Vec<u8>> {
    let nbytes = layout.byte_count();
    // grows with the input so that bogus sizes do not allocate up front
    let mut data = Vec::new();
    let mut filled = 0;
    while filled < nbytes {
        let end = usize::min(filled + CHUNK_SIZE, nbytes);
        data.resize(end, 0);
        let n = read_chunk(&mut source, &mut data[filled..end])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    data.truncate(filled);
    if filled < nbytes {
        return Err(NrrdError::SizeMismatch(
            layout.element_count(),
            filled / layout.item_size,
        ));
    }
    Ok(data)
}

/// Read a whole stream, keeping only its last bytes, as many as the data
/// needs.
fn read_tail<R: Read>(mut source: R, layout: &DataLayout) -> Result<Vec<u8>> {
    let nbytes = layout.byte_count();
    let mut ring = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = read_chunk(&mut source, &mut chunk)?;
        if n == 0 {
            break;
        }
        let mut data = &chunk[..n];
        if ring.len() < nbytes {
            let take = usize::min(nbytes - ring.len(), data.len());
            ring.extend_from_slice(&data[..take]);
            total += take as u64;
            data = &data[take..];
        }
        push_tail(&mut ring, total, data);
        total += data.len() as u64;
    }
    if total < nbytes as u64 {
        return Err(NrrdError::SizeMismatch(
            layout.element_count(),
            total as usize / layout.item_size,
        ));
    }
    if nbytes > 0 {
        ring.rotate_left((total % nbytes as u64) as usize);
    }
    Ok(ring)
}

/// Write `data` into the ring buffer, where `offset` is the amount of bytes
/// written to it so far.
fn push_tail(ring: &mut [u8], offset: u64, data: &[u8]) {
    let len = ring.len();
    if len == 0 {
        return;
    }
    let (offset, data) = if data.len() > len {
        let cut = data.len() - len;
        (offset + cut as u64, &data[cut..])
    } else {
        (offset, data)
    };
    let pos = (offset % len as u64) as usize;
    let first = usize::min(len - pos, data.len());
    ring[pos..pos + first].copy_from_slice(&data[..first]);
    ring[..data.len() - first].copy_from_slice(&data[first..]);
}

fn decode_compressed<R: Read>(mut decoder: R, layout: &DataLayout) -> Result<Vec<u8>> {
    if layout.byte_skip == -1 {
        return read_tail(decoder, layout);
    }
    skip_bytes(&mut decoder, layout.byte_skip as u64)?;
    let data = read_exactly(&mut decoder, layout)?;
    let extra = io::copy(&mut decoder, &mut io::sink())? as usize;
    if extra > 0 {
        return Err(NrrdError::SizeMismatch(
            layout.element_count(),
            (data.len() + extra) / layout.item_size,
        ));
    }
    Ok(data)
}

fn push_ascii_sample(datatype: NrrdType, token: &[u8], out: &mut Vec<u8>) -> Result<()> {
    fn push<T: DataElement>(text: &str, out: &mut Vec<u8>) -> Result<()> {
        let v = T::parse_ascii(text)
            .ok_or_else(|| NrrdError::InvalidAsciiSample(text.to_string(), T::DATA_TYPE))?;
        out.extend_from_slice(bytemuck::bytes_of(&v));
        Ok(())
    }

    let text = std::str::from_utf8(token).map_err(|_| {
        NrrdError::InvalidAsciiSample(String::from_utf8_lossy(token).into_owned(), datatype)
    })?;
    with_element_type!(datatype, T => push::<T>(text, out),
        Block => Err(NrrdError::UnsupportedDataType(NrrdType::Block)))
}

/// Parse whitespace separated samples into native element bytes. Stops at
/// the first sample beyond the expected amount.
fn decode_ascii<R: BufRead>(mut source: R, layout: &DataLayout) -> Result<Vec<u8>> {
    let expected = layout.element_count();
    let mut out = Vec::with_capacity(usize::min(layout.byte_count(), CHUNK_SIZE));
    let mut token = Vec::new();
    let mut count = 0usize;
    let mut flush = |token: &mut Vec<u8>, out: &mut Vec<u8>| -> Result<()> {
        if token.is_empty() {
            return Ok(());
        }
        if count == expected {
            return Err(NrrdError::SizeMismatch(expected, count + 1));
        }
        push_ascii_sample(layout.datatype, token, out)?;
        count += 1;
        token.clear();
        Ok(())
    };
    loop {
        let used = {
            let buf = source.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            for &b in buf {
                if b.is_ascii_whitespace() {
                    flush(&mut token, &mut out)?;
                } else {
                    token.push(b);
                }
            }
            buf.len()
        };
        source.consume(used);
    }
    flush(&mut token, &mut out)?;
    if count != expected {
        return Err(NrrdError::SizeMismatch(expected, count));
    }
    Ok(out)
}

/// Parameters for encoding the data section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    /// Data encoding.
    pub encoding: Encoding,
    /// Byte order of binary multi-byte elements.
    pub endianness: Endianness,
    /// Compression level, from 1 (fastest) to 9 (smallest).
    pub compression_level: u32,
    /// Samples per line of ASCII data.
    pub row_len: usize,
}

/// Run `f` over a writer which applies the compression of the given
/// encoding, finishing the compressed stream afterwards.
fn with_encoder<W, F>(writer: W, params: &EncodeParams, f: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match params.encoding {
        Encoding::Gzip => {
            let level = flate2::Compression::new(params.compression_level);
            let mut e = GzEncoder::new(writer, level);
            f(&mut e)?;
            let _ = e.finish()?;
        }
        Encoding::Bzip2 => {
            let level = bzip2::Compression::new(params.compression_level);
            let mut e = BzEncoder::new(writer, level);
            f(&mut e)?;
            let _ = e.finish()?;
        }
        Encoding::Raw | Encoding::Ascii => {
            let mut writer = writer;
            f(&mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Encode a sequence of samples, given in the order in which they are
/// stored (fastest axis first).
pub fn encode_samples<W, T, I>(writer: W, samples: I, params: &EncodeParams) -> Result<()>
where
    W: Write,
    T: DataElement,
    I: IntoIterator<Item = T>,
{
    with_encoder(writer, params, |w| {
        if params.encoding == Encoding::Ascii {
            write_ascii(w, samples, params.row_len)
        } else {
            write_binary(w, samples, params.endianness)
        }
    })
}

/// Encode raw element bytes, swapping each element of `item_size` bytes
/// when `swap` is set. Only binary encodings are supported.
pub fn encode_raw_bytes<W: Write>(
    writer: W,
    data: &[u8],
    item_size: usize,
    swap: bool,
    params: &EncodeParams,
) -> Result<()> {
    with_encoder(writer, params, |w| {
        let chunk_len = usize::max(CHUNK_SIZE - CHUNK_SIZE % item_size, item_size);
        let mut swapped = Vec::new();
        for chunk in data.chunks(chunk_len) {
            if swap && item_size > 1 {
                swapped.clear();
                swapped.extend_from_slice(chunk);
                swapped.chunks_exact_mut(item_size).for_each(|e| e.reverse());
                w.write_all(&swapped)?;
            } else {
                w.write_all(chunk)?;
            }
        }
        Ok(())
    })
}

fn write_binary<T, I>(w: &mut dyn Write, samples: I, endianness: Endianness) -> Result<()>
where
    T: DataElement,
    I: IntoIterator<Item = T>,
{
    let per_chunk = usize::max(CHUNK_SIZE / std::mem::size_of::<T>(), 1);
    let mut elements = Vec::with_capacity(per_chunk);
    let mut bytes = Vec::with_capacity(per_chunk * std::mem::size_of::<T>());
    let mut samples = samples.into_iter();
    loop {
        elements.clear();
        elements.extend(samples.by_ref().take(per_chunk));
        if elements.is_empty() {
            break;
        }
        bytes.clear();
        T::extend_raw_bytes(&elements, endianness, &mut bytes);
        w.write_all(&bytes)?;
    }
    Ok(())
}

fn write_ascii<T, I>(w: &mut dyn Write, samples: I, row_len: usize) -> Result<()>
where
    T: DataElement,
    I: IntoIterator<Item = T>,
{
    let row_len = usize::max(row_len, 1);
    let mut line = String::new();
    for (i, v) in samples.into_iter().enumerate() {
        if i % row_len != 0 {
            line.push(' ');
        }
        line.push_str(&v.format_ascii());
        if (i + 1) % row_len == 0 {
            line.push('\n');
            w.write_all(line.as_bytes())?;
            line.clear();
        }
    }
    if !line.is_empty() {
        line.push('\n');
        w.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// Samples per line for ASCII data of the given sizes: one line per row of
/// the fastest axis, or one sample per line for a single axis.
pub fn ascii_row_len(sizes: &[usize]) -> usize {
    if sizes.len() >= 2 {
        sizes[0]
    } else {
        1
    }
}
