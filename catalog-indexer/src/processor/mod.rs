//! Processor module for the catalog indexer pipeline.
//!
//! Turns the joined source rows of a movie into its search document.

mod document_assembler;

pub use document_assembler::DocumentAssembler;
