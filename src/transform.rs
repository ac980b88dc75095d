//! Echo Transform
//!
//! The server's only processing step: every ASCII lowercase byte (`a`-`z`)
//! becomes its uppercase counterpart. Every other byte, including UTF-8
//! continuation bytes and control characters, passes through untouched, so
//! the output always has exactly the input's length.

/// Uppercases the ASCII letters of `chunk` in place.
#[inline]
pub fn uppercase_in_place(chunk: &mut [u8]) {
    chunk.make_ascii_uppercase();
}

/// Returns an uppercased copy of `chunk`.
pub fn uppercased(chunk: &[u8]) -> Vec<u8> {
    let mut out = chunk.to_vec();
    uppercase_in_place(&mut out);
    out
}
