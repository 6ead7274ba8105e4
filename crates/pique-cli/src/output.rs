use pique_core::protein::ProteinRegistry;
use serde::Serialize;

#[derive(Serialize)]
struct ProteinRow<'a> {
    protein: &'a str,
    is_decoy: bool,
    pep: f64,
    q_value: f64,
    empirical_q_value: f64,
    p_value: f64,
    peptides: String,
}

/// Write the per-protein report as tab-separated values, most confident
/// protein first
pub fn write_report(path: &str, registry: &ProteinRegistry) -> anyhow::Result<()> {
    let mut proteins = registry.proteins().collect::<Vec<_>>();
    proteins.sort_by(|a, b| a.pep.total_cmp(&b.pep).then_with(|| a.name.cmp(&b.name)));

    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    for protein in proteins {
        writer.serialize(ProteinRow {
            protein: &protein.name,
            is_decoy: protein.decoy,
            pep: protein.pep,
            q_value: protein.q,
            empirical_q_value: protein.q_emp,
            p_value: protein.p,
            peptides: protein
                .peptides
                .iter()
                .map(|peptide| peptide.sequence.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        })?;
    }
    writer.flush()?;
    log::info!("wrote protein report to {}", path);
    Ok(())
}
