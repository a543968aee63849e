//! Async normalization pipeline over an extracted kl06 dump.
//!
//! Wires the pure per-record normalizers from [`kl06_records`] into a
//! bounded-concurrency batch run: directory layout and staging, superseded-by
//! reference resolution, cross-reference assembly, and the per-kind batches
//! that produce a [`kl06_core::snapshot::Snapshot`].

mod assembler;
mod batch;
mod layout;
mod pipeline;
mod resolver;

#[cfg(test)]
mod tests;

pub use assembler::Assembler;
pub use batch::DEFAULT_CONCURRENCY;
pub use layout::DumpLayout;
pub use pipeline::Pipeline;
pub use resolver::Resolver;
