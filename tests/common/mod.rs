// Shared helpers for integration tests

pub mod fakes;

pub use fakes::{FakeLocator, FakeRunner, Scripted, gopro_probe_stderr};
