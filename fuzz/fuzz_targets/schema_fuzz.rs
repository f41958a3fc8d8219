//! Schema fuzz target: feed arbitrary text to the XML catalogue compiler.
//! Compilation must not panic; when it succeeds the graph must be fully linked.
//! Build with: cargo fuzz run schema_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(defs) = ubxgen::compile(s) {
        assert!(defs.is_linked());
        let _ = ubxgen::generate(&defs, &ubxgen::GenerateOptions::default());
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run schema_fuzz");
}
