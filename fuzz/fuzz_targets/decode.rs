// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use std::io::Cursor;
use libfuzzer_sys::fuzz_target;

use gifanim::Decoder;

fuzz_target!(|data: &[u8]| {
    let decoder = Decoder::new(Cursor::new(data)).max_image_sz(Some(1 << 20));
    for step in decoder {
        if step.is_err() {
            return;
        }
    }
});
