//! Benchmark crate for the limn workspace.
//!
//! All content lives in `benches/`; this library target exists so the
//! crate participates in the workspace build.
