mod util;

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2, Array3, Ix2, Ix3};
use nrrd::field::field_map_from_tags;
use nrrd::{
    Endianness, InMemNrrdObject, InMemNrrdVolume, IndexOrder, IntoNdArray, NrrdHeader,
    NrrdObject, NrrdType, ReaderOptions, Value, WriterOptions,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use util::ramp_volume;

fn read_i16_volume<P: AsRef<Path>>(path: P) -> (NrrdHeader, Array3<i16>) {
    let obj = InMemNrrdObject::from_file(path).unwrap();
    let header = obj.header().clone();
    let data = obj.into_volume().into_ndarray::<i16>().unwrap();
    (header, data.into_dimensionality::<Ix3>().unwrap())
}

/// Everything after the blank line ending the header.
fn data_section(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .windows(2)
        .position(|w| w == b"\n\n")
        .expect("no end of header");
    &bytes[end + 2..]
}

#[test]
fn round_trip_all_encodings() {
    let dir = tempdir().unwrap();
    let data = ramp_volume(30);
    for encoding in &["raw", "gzip", "bzip2", "ascii"] {
        let path = dir.path().join(format!("ramp_{}.nrrd", encoding));
        let reference = NrrdHeader::new()
            .with_field("encoding", *encoding)
            .with_field("space", "left-posterior-superior")
            .with_field("space dimension", 3i64)
            .with_field("spacings", vec![1.5, 1.5, 2.0]);
        let written = WriterOptions::new(&path)
            .reference_header(&reference)
            .write_nrrd(&data)
            .unwrap();
        assert!(!written.contains("space dimension"));

        let (header, read) = read_i16_volume(&path);
        assert_eq!(header, written);
        assert_eq!(header["type"], Value::from("int16"));
        assert_eq!(header["sizes"], Value::IntList(vec![30, 30, 30]));
        assert_eq!(header["spacings"], Value::DoubleList(vec![1.5, 1.5, 2.0]));
        assert_eq!(header.contains("endian"), *encoding != "ascii");
        assert_eq!(read, data);
    }
}

#[test]
fn default_encoding_is_gzip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("default.nrrd");
    let data = ramp_volume(4);
    let header = WriterOptions::new(&path)
        .compression_level(1)
        .write_nrrd(&data)
        .unwrap();
    assert_eq!(header["encoding"], Value::from("gzip"));

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"NRRD0005\n# "));
    assert_eq!(&data_section(&bytes)[..2], &[0x1f, 0x8b]);
    assert_eq!(read_i16_volume(&path).1, data);
}

#[test]
fn header_text_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.nrrd");
    let reference = NrrdHeader::new()
        .with_field("encoding", "raw")
        .with_field("space origin", Value::DoubleVector(vec![0.1, 0., -3.]))
        .with_field("space", "right-anterior-superior")
        .with_field("kinds", vec!["domain", "domain"])
        .with_field("byte skip", 12i64)
        .with_key_value("software", "tests");
    let _ = WriterOptions::new(&path)
        .reference_header(&reference)
        .endianness(Endianness::Little)
        .preamble(false)
        .write_nrrd(&array![[1u16, 2], [3, 4]])
        .unwrap();

    let bytes = fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&bytes[..bytes.len() - 8]).into_owned();
    assert_eq!(
        text,
        "NRRD0005
type: uint16
dimension: 2
space: right-anterior-superior
sizes: 2 2
kinds: domain domain
endian: little
encoding: raw
space origin: (0.10000000000000001,0,-3)
software:=tests

"
    );
    assert_eq!(data_section(&bytes), &[1, 0, 3, 0, 2, 0, 4, 0]);
}

#[test]
fn big_endian_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("be.nrrd");
    let reference = NrrdHeader::new().with_field("encoding", "raw");
    let header = WriterOptions::new(&path)
        .reference_header(&reference)
        .endianness(Endianness::Big)
        .write_nrrd(&array![256i16, -2])
        .unwrap();
    assert_eq!(header["endian"], Value::from("big"));
    let bytes = fs::read(&path).unwrap();
    assert_eq!(data_section(&bytes), &[0x01, 0x00, 0xff, 0xfe]);

    let obj = InMemNrrdObject::from_file(&path).unwrap();
    let data = obj.into_volume().into_ndarray::<i16>().unwrap();
    assert_eq!(data.as_slice_memory_order().unwrap(), &[256, -2]);
}

#[test]
fn detached_header() {
    let dir = tempdir().unwrap();
    let data = ramp_volume(5);

    let nhdr = dir.path().join("volume.nhdr");
    let reference = NrrdHeader::new().with_field("encoding", "raw");
    let header = WriterOptions::new(&nhdr)
        .reference_header(&reference)
        .write_nrrd(&data)
        .unwrap();
    assert_eq!(header["data file"], Value::from("volume.raw"));
    assert!(dir.path().join("volume.raw").exists());
    assert_eq!(
        fs::metadata(dir.path().join("volume.raw")).unwrap().len(),
        5 * 5 * 5 * 2
    );
    assert_eq!(read_i16_volume(&nhdr).1, data);

    // data goes into the .nrrd file, next to a .nhdr header
    let nrrd = dir.path().join("pair.nrrd");
    let header = WriterOptions::new(&nrrd)
        .detached_header(true)
        .write_nrrd(&data)
        .unwrap();
    assert_eq!(header["data file"], Value::from("pair.nrrd"));
    let pair_header = dir.path().join("pair.nhdr");
    assert!(pair_header.exists());
    assert_eq!(read_i16_volume(&pair_header).1, data);

    // absolute reference to the data file
    let nhdr = dir.path().join("absolute.nhdr");
    let header = WriterOptions::new(&nhdr)
        .relative_data_path(false)
        .write_nrrd(&data)
        .unwrap();
    let data_file = header["data file"].as_str().unwrap().to_string();
    assert!(Path::new(&data_file).is_absolute());
    assert!(data_file.ends_with("absolute.raw.gz"));
    assert_eq!(read_i16_volume(&nhdr).1, data);
}

#[test]
fn stale_data_file_is_dropped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("attached.nrrd");
    let reference = NrrdHeader::new()
        .with_field("encoding", "raw")
        .with_field("data file", "missing.raw")
        .with_field("line skip", 3i64);
    let header = WriterOptions::new(&path)
        .reference_header(&reference)
        .write_nrrd(&array![1u8, 2, 3])
        .unwrap();
    assert!(!header.contains("data file"));
    assert!(!header.contains("line skip"));
    let obj = InMemNrrdObject::from_file(&path).unwrap();
    let data = obj.into_volume().into_ndarray::<u8>().unwrap();
    assert_eq!(data.as_slice_memory_order().unwrap(), &[1, 2, 3]);
}

#[test]
fn detached_copy_keeps_source_data() {
    let dir = tempdir().unwrap();
    let data = ramp_volume(4);
    let source = dir.path().join("volume.nhdr");
    let reference = NrrdHeader::new().with_field("encoding", "raw");
    let _ = WriterOptions::new(&source)
        .reference_header(&reference)
        .write_nrrd(&data)
        .unwrap();
    let source_bytes = fs::read(dir.path().join("volume.raw")).unwrap();

    let (mut header, read) = read_i16_volume(&source);
    assert_eq!(header["data file"], Value::from("volume.raw"));
    let _ = header.insert("encoding", "gzip");

    let copy = dir.path().join("copy.nhdr");
    let written = WriterOptions::new(&copy)
        .reference_header(&header)
        .write_nrrd(&read)
        .unwrap();
    assert_eq!(written["data file"], Value::from("copy.raw.gz"));
    assert!(dir.path().join("copy.raw.gz").exists());
    assert_eq!(fs::read(dir.path().join("volume.raw")).unwrap(), source_bytes);
    assert_eq!(read_i16_volume(&source).1, data);
    assert_eq!(read_i16_volume(&copy).1, data);
}

#[test]
fn c_index_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("c.nrrd");
    let data: Array2<f32> = array![[1., 2., 3.], [4., 5., 6.]];
    let header = WriterOptions::new(&path)
        .index_order(IndexOrder::C)
        .write_nrrd(&data)
        .unwrap();
    assert_eq!(header["sizes"], Value::IntList(vec![3, 2]));

    let (read, _) = ReaderOptions::new()
        .index_order(IndexOrder::C)
        .read_array::<f32, _>(&path)
        .unwrap();
    assert_eq!(read.into_dimensionality::<Ix2>().unwrap(), data);

    let (read, _) = ReaderOptions::new().read_array::<f32, _>(&path).unwrap();
    assert_eq!(read.shape(), &[3, 2]);
    assert_eq!(read[[2, 0]], 3.);
}

#[test]
fn ascii_doubles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doubles.nrrd");
    let data = array![[0.1, 1e-7, -2.5], [1e20, 3., std::f64::consts::PI]];
    let reference = NrrdHeader::new().with_field("encoding", "ascii");
    let header = WriterOptions::new(&path)
        .reference_header(&reference)
        .endianness(Endianness::Big)
        .write_nrrd(&data)
        .unwrap();
    assert!(!header.contains("endian"));

    let bytes = fs::read(&path).unwrap();
    let text = String::from_utf8(data_section(&bytes).to_vec()).unwrap();
    let rows: Vec<_> = text.lines().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], "0.10000000000000001 1e+20");

    let obj = InMemNrrdObject::from_file(&path).unwrap();
    let read = obj.into_volume().into_ndarray::<f64>().unwrap();
    let read = read.into_dimensionality::<Ix2>().unwrap();
    assert_abs_diff_eq!(read, data, epsilon = 0.);
}

#[test]
fn write_volumes() {
    let dir = tempdir().unwrap();

    let volume = InMemNrrdVolume::from_raw_data(
        &[2, 2],
        NrrdType::Int32,
        vec![0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0xff, 0xff, 0xff, 0xfc],
        Endianness::Big,
    )
    .unwrap();
    for encoding in &["raw", "gzip", "ascii"] {
        let path = dir.path().join(format!("int32_{}.nrrd", encoding));
        let reference = NrrdHeader::new().with_field("encoding", *encoding);
        let _ = WriterOptions::new(&path)
            .reference_header(&reference)
            .endianness(Endianness::Little)
            .write_volume(&volume)
            .unwrap();
        let obj = InMemNrrdObject::from_file(&path).unwrap();
        let data = obj.into_volume().into_ndarray::<i32>().unwrap();
        assert_eq!(data.as_slice_memory_order().unwrap(), &[1, 2, 3, -4]);
    }

    let blocks = InMemNrrdVolume::from_raw_blocks(&[3], 2, b"abcdef".to_vec()).unwrap();
    let path = dir.path().join("blocks.nrrd");
    let reference = NrrdHeader::new().with_field("encoding", "bzip2");
    let header = WriterOptions::new(&path)
        .reference_header(&reference)
        .write_volume(&blocks)
        .unwrap();
    assert_eq!(header["block size"], Value::Int(2));
    assert!(!header.contains("endian"));
    let obj = InMemNrrdObject::from_file(&path).unwrap();
    assert_eq!(obj.volume(), &blocks);

    let reference = NrrdHeader::new().with_field("encoding", "ascii");
    assert!(WriterOptions::new(dir.path().join("blocks.txt.nrrd"))
        .reference_header(&reference)
        .write_volume(&blocks)
        .is_err());
}

#[test]
fn custom_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.nrrd");
    let custom = field_map_from_tags(vec![
        ("transform", "double matrix"),
        ("factors", "int vector"),
        ("names", "quoted string list"),
    ])
    .unwrap();
    let reference = NrrdHeader::new()
        .with_field("encoding", "raw")
        .with_field("transform", array![[1., 0.5], [0., 1.]])
        .with_field("factors", Value::IntVector(vec![1, 2, 3]))
        .with_field("names", vec!["first name", "second"]);
    let _ = WriterOptions::new(&path)
        .reference_header(&reference)
        .custom_fields(custom.clone())
        .write_nrrd(&array![7u8])
        .unwrap();

    let text = String::from_utf8_lossy(&fs::read(&path).unwrap()).into_owned();
    assert!(text.contains("transform:=(1,0.5) (0,1)\n"));
    assert!(text.contains("factors:=(1,2,3)\n"));
    assert!(text.contains("names:=\"first name\" \"second\"\n"));

    let obj = ReaderOptions::new()
        .custom_fields(custom)
        .read_file(&path)
        .unwrap();
    let header = obj.header();
    assert_eq!(header["transform"], reference["transform"]);
    assert_eq!(header["factors"], reference["factors"]);
    assert_eq!(header["names"], reference["names"]);

    // without the types, the values come back as key/value text
    let obj = InMemNrrdObject::from_file(&path).unwrap();
    assert_eq!(obj.header().key_value("factors"), Some("(1,2,3)"));
    assert!(!obj.header().contains("factors"));
}

#[test]
fn invalid_write_encoding() {
    let dir = tempdir().unwrap();
    let reference = NrrdHeader::new().with_field("encoding", "lz4");
    let err = WriterOptions::new(dir.path().join("x.nrrd"))
        .reference_header(&reference)
        .write_nrrd(&array![1u8])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid encoding specification while writing NRRD file: lz4"
    );
}
