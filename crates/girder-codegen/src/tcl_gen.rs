//! TCL driver rendering.
//!
//! Two styles, selected per run: a single `proof_structure`
//! assume-guarantee chain, or one task per step with explicit
//! `assume -from_assert` promotion of all earlier steps.

use girder_engine::FlatProofSequence;

/// `proof_structure -create assume_guarantee` over the step patterns.
pub fn flat_to_proof_structure(seq: &FlatProofSequence) -> String {
    let mut patterns = String::new();
    for step in &seq.props {
        let names: Vec<String> = step.iter().map(|p| format!("*.{}", p.name)).collect();
        patterns.push_str(&format!(" {{{}}}", names.join(" ")));
    }

    format!(
        "proof_structure -init root -copy_asserts -copy_assumes\n\
         proof_structure -create assume_guarantee -from root -property [list{patterns}]\n"
    )
}

/// One task per step, copying that step and all earlier ones, with
/// earlier steps' properties promoted to assumptions.
pub fn flat_to_tasks(seq: &FlatProofSequence) -> String {
    let mut out = String::new();
    for i in 0..seq.props.len() {
        let copied: Vec<String> = seq.props[..=i]
            .iter()
            .flatten()
            .map(|p| format!("*.{}", p.name))
            .collect();
        out.push_str(&format!(
            "task -create Step{i} -copy_assumes -copy {{ {} }}\n",
            copied.join(" ")
        ));

        let promoted: Vec<String> = seq.props[..i]
            .iter()
            .flatten()
            .map(|p| format!("Step{i}::*.{}", p.name))
            .collect();
        if !promoted.is_empty() {
            out.push_str(&format!(
                "assume -from_assert {{ {} }}\n",
                promoted.join(" ")
            ));
        }
    }
    out
}
