#![no_main]

use libfuzzer_sys::fuzz_target;
use pen_interp::{Session, SessionConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        let config = SessionConfig {
            while_iteration_limit: 16,
            max_block_depth: 16,
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(config);
        let summary = session.run(source);
        assert_eq!(summary.errors, summary.diagnostics.len());

        let snapshot = session.snapshot();
        let _ = serde_json::to_string(&snapshot);
    }
});
