//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one part of the
//! controller against mock adapters. All tests run on the host with no
//! radio or board attached.

mod battery_tests;
mod mock_hw;
mod network_tests;
