//! Test utilities for runtime testing
//!
//! Fixtures shared by the unit tests of the runtime modules: a stand-in
//! module instance and a minimal instruction type whose `End` closes a
//! label region.
