#![no_main]

use libfuzzer_sys::fuzz_target;
use pen_interp::Script;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        let script = Script::parse(source);
        let _ = script.diagnostics();
        let _ = script.statement_count();
    }
});
