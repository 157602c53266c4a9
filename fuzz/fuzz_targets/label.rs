#![no_main]
use date_decider_libs::label::{decode, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // anything that decodes must survive a second trip unchanged
    if let Ok(date) = decode(data) {
        assert_eq!(
            decode(&encode(&date)),
            Ok(date),
            "Label {:?} did not read back as {}",
            data,
            date
        );
    }
});
