// Report generation: prompt assembly and calls to the text-generation service.
// All model calls go through the Generator trait so callers can run against fakes.

pub mod generator;
pub mod handlers;
pub mod prompts;

pub use generator::{Generator, ReportGenerator};
