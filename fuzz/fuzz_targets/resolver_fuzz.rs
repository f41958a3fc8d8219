//! Resolver fuzz target: type codes and bit specifiers from arbitrary text.
//! Neither resolver may panic; lenient masks must never fail, and strict masks must
//! agree with lenient ones whenever they succeed.
//! Build with: cargo fuzz run resolver_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = ubxgen::ctype::resolve(s);
    let lenient = ubxgen::mask::resolve(s, ubxgen::MaskPolicy::Lenient);
    assert!(lenient.is_ok());
    if let Ok(strict) = ubxgen::mask::resolve(s, ubxgen::MaskPolicy::Strict) {
        assert_eq!(Ok(strict), lenient);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run resolver_fuzz");
}
