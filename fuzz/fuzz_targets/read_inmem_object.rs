#![no_main]
use libfuzzer_sys::fuzz_target;
use nrrd::InMemNrrdObject;

fuzz_target!(|data: &[u8]| {
    let _ = InMemNrrdObject::from_reader(data);
});
