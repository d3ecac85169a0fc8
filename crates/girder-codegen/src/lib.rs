//! Output rendering for girder.
//!
//! The flat proof sequence renders twice: once as a SystemVerilog file
//! of named `assume`/`assert` properties grouped per step, and once as
//! a TCL driver instructing the prover to discharge each step under
//! the earlier ones (an assume-guarantee chain).

pub mod sva_gen;
pub mod tcl_gen;

pub use sva_gen::{flat_to_sva, property_to_sva, EmitOptions};
pub use tcl_gen::{flat_to_proof_structure, flat_to_tasks};
