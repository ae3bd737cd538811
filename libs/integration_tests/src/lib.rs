//! Round-trip tests: programs are compiled, then executed on a small
//! register machine that understands the emitted instruction set.

#[cfg(test)]
mod common;
#[cfg(test)]
mod machine;
