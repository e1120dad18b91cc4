//! The default ENPKG processing chain.

use super::{DirtyPipelineDomainError, PipelineStage};
use std::collections::HashSet;

const PYTHON: &str = "python3";
const SCRIPTS_ROOT: &str = "/opt/enpkg";

fn stage(
    name: &str,
    task_type: &str,
    description: &str,
    script: &str,
    extra_args: &[&str],
) -> PipelineStage {
    let args = std::iter::once(format!("{SCRIPTS_ROOT}/{script}"))
        .chain(extra_args.iter().map(|arg| (*arg).to_owned()))
        .collect();
    PipelineStage {
        name: name.to_owned(),
        task_type: task_type.to_owned(),
        description: description.to_owned(),
        program: PYTHON.to_owned(),
        args,
    }
}

/// Returns the eighteen stages run on every payload, in execution order.
#[must_use]
pub fn default_stages() -> Vec<PipelineStage> {
    let payload = ["--payload", "{{ payload_path }}"];
    let sample = ["--payload", "{{ payload_path }}", "--sample-id", "{{ payload_id }}"];
    vec![
        stage(
            "data_organization",
            "Data organization",
            "Unpack the upload and sort files per sample",
            "data_organization/src/process_and_move_files.py",
            &sample,
        ),
        stage(
            "taxo_enhancer",
            "Taxonomy enhancement",
            "Resolve sample organisms against reference taxonomies",
            "taxo_enhancer/src/taxo_info_fetcher.py",
            &payload,
        ),
        stage(
            "mzmine_preprocessing",
            "Spectra preprocessing",
            "Peak picking and alignment of raw spectra",
            "mzmine_preprocessing/src/batch_processing.py",
            &sample,
        ),
        stage(
            "molecular_networking",
            "Molecular networking",
            "Build the per-sample molecular network",
            "mn_isdb_taxo/src/molecular_network.py",
            &payload,
        ),
        stage(
            "massive_id",
            "Massive ID",
            "Register the dataset with MassIVE",
            "massive_id/src/massive_id_fetcher.py",
            &payload,
        ),
        stage(
            "isdb_annotation",
            "ISDB annotation",
            "Annotate spectra against the in-silico database",
            "mn_isdb_taxo/src/isdb_annotation.py",
            &payload,
        ),
        stage(
            "taxonomic_reweighting",
            "Taxonomic reweighting",
            "Reweight annotations by taxonomic proximity",
            "mn_isdb_taxo/src/taxo_reweighting.py",
            &payload,
        ),
        stage(
            "sirius_formula",
            "SIRIUS formula prediction",
            "Predict molecular formulas with SIRIUS",
            "sirius_canopus/src/sirius_formula.py",
            &sample,
        ),
        stage(
            "csi_fingerid",
            "CSI:FingerID annotation",
            "Predict structures with CSI:FingerID",
            "sirius_canopus/src/csi_fingerid.py",
            &sample,
        ),
        stage(
            "canopus",
            "CANOPUS classification",
            "Classify compounds with CANOPUS",
            "sirius_canopus/src/canopus.py",
            &sample,
        ),
        stage(
            "chemical_class_rollup",
            "Chemical class rollup",
            "Aggregate compound classes per sample",
            "meta_analysis/src/chemical_class_rollup.py",
            &payload,
        ),
        stage(
            "feature_quantification",
            "Feature quantification",
            "Quantify aligned features across samples",
            "meta_analysis/src/feature_quantification.py",
            &payload,
        ),
        stage(
            "memo_fingerprints",
            "MEMO fingerprints",
            "Compute MS2 fingerprints for sample comparison",
            "meta_analysis/src/memo_fingerprints.py",
            &payload,
        ),
        stage(
            "graph_samples",
            "Graph samples",
            "Emit sample triples",
            "graph_builder/src/samples.py",
            &["--payload", "{{ payload_path }}", "--task-id", "{{ task_id }}"],
        ),
        stage(
            "graph_features",
            "Graph features",
            "Emit feature triples",
            "graph_builder/src/features.py",
            &["--payload", "{{ payload_path }}", "--task-id", "{{ task_id }}"],
        ),
        stage(
            "graph_annotations",
            "Graph annotations",
            "Emit annotation triples",
            "graph_builder/src/annotations.py",
            &["--payload", "{{ payload_path }}", "--task-id", "{{ task_id }}"],
        ),
        stage(
            "graph_taxonomy",
            "Graph taxonomy",
            "Emit taxonomy triples",
            "graph_builder/src/taxonomy.py",
            &["--payload", "{{ payload_path }}", "--task-id", "{{ task_id }}"],
        ),
        stage(
            "rdf_export",
            "RDF export",
            "Merge and export the sample graph",
            "graph_builder/src/merge_and_export.py",
            &[
                "--payload",
                "{{ payload_path }}",
                "--run",
                "{{ parent_task_id }}",
            ],
        ),
    ]
}

/// Checks that a stage list can be run.
///
/// # Errors
///
/// Returns [`DirtyPipelineDomainError::EmptyPipeline`] for an empty list,
/// [`DirtyPipelineDomainError::DuplicateStage`] when names repeat, and
/// [`DirtyPipelineDomainError::MissingProgram`] for a blank program.
pub fn validate_stages(stages: &[PipelineStage]) -> Result<(), DirtyPipelineDomainError> {
    if stages.is_empty() {
        return Err(DirtyPipelineDomainError::EmptyPipeline);
    }
    let mut seen = HashSet::new();
    for candidate in stages {
        if !seen.insert(candidate.name.as_str()) {
            return Err(DirtyPipelineDomainError::DuplicateStage(
                candidate.name.clone(),
            ));
        }
        if candidate.program.trim().is_empty() {
            return Err(DirtyPipelineDomainError::MissingProgram(
                candidate.name.clone(),
            ));
        }
    }
    Ok(())
}
