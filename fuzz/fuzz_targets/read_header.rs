#![no_main]
use libfuzzer_sys::fuzz_target;
use nrrd::header::write_header;
use nrrd::{FieldMap, NrrdHeader};

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = NrrdHeader::from_reader(data) {
        let _ = header.get("sizes").map(|v| v.to_string());
        let _ = header.get("space directions").map(|v| v.to_optional_rows());
        let mut out = Vec::new();
        let _ = write_header(&mut out, &header, &FieldMap::new(), true);
    }
});
