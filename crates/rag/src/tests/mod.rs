//! Scenario tests for the generation loop and the answer assembler.

pub mod support;

mod assembler;
