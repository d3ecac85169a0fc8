//! End-to-end generation: proof document to flat proof sequence.

use girder_dsl::ast::ProofDocument;

use crate::commands::gen_lemma;
use crate::errors::GenError;
use crate::provable::FlatProofSequence;
use crate::scope::Scope;

/// Generate the root lemma's obligations, flatten them into numbered
/// steps, and make property names unique.
pub fn build(document: &ProofDocument, root: &str) -> Result<FlatProofSequence, GenError> {
    let mut scope = Scope::new(document.lemmas.clone(), document.defs.clone());
    let lemma = scope
        .lemmas
        .get(root)
        .cloned()
        .ok_or_else(|| GenError::UnknownLemma {
            name: root.to_string(),
        })?;

    let provable = gen_lemma(&lemma, &mut scope)?;

    let mut flat = FlatProofSequence::default();
    provable.flatten_into(&mut flat, 0);
    flat.wires = scope.take_wires();
    flat.check_names();
    Ok(flat)
}
