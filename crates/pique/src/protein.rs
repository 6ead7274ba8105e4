//! Protein registry: aggregates peptide-spectrum matches into per-protein
//! records and fixed target/decoy name sets, and publishes the statistics
//! computed from a ranked probability list back onto each protein.

use fnv::{FnvHashMap, FnvHashSet};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

use crate::inference::RankedGroup;
use crate::stats::qvalue::RankStatistics;

/// One peptide-spectrum match as exposed by the upstream peptide scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsmRecord {
    pub peptide: String,
    pub decoy: bool,
    pub proteins: Vec<String>,
    pub pep: f64,
    pub q: f64,
    pub p: f64,
}

/// Peptide evidence owned by a single protein. The same sequence may recur
/// under other proteins as a separate record.
#[derive(Debug, Clone, Serialize)]
pub struct Peptide {
    pub sequence: String,
    pub decoy: bool,
    pub pep: f64,
    pub q: f64,
    pub p: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Protein {
    pub name: String,
    pub decoy: bool,
    pub peptides: Vec<Peptide>,
    pub pep: f64,
    pub q: f64,
    pub q_emp: f64,
    pub p: f64,
}

/// Owned mapping from protein name to record, plus the target/decoy name
/// sets derived from the PSM stream. The decoy flag of a protein is fixed
/// by the first match that names it; the sets partition the registry and
/// stay fixed for its lifetime regardless of later probability reshuffling.
#[derive(Debug, Default)]
pub struct ProteinRegistry {
    proteins: FnvHashMap<String, Protein>,
    targets: FnvHashSet<String>,
    decoys: FnvHashSet<String>,
}

impl ProteinRegistry {
    /// Single scan over the PSM stream: create each protein on first sight,
    /// append peptide evidence on every sight
    pub fn from_psms(psms: &[PsmRecord]) -> Self {
        let mut registry = ProteinRegistry::default();
        for psm in psms {
            for name in &psm.proteins {
                let peptide = Peptide {
                    sequence: psm.peptide.clone(),
                    decoy: psm.decoy,
                    pep: psm.pep,
                    q: psm.q,
                    p: psm.p,
                };
                match registry.proteins.entry(name.clone()) {
                    Entry::Occupied(mut entry) => entry.get_mut().peptides.push(peptide),
                    Entry::Vacant(entry) => {
                        entry.insert(Protein {
                            name: name.clone(),
                            decoy: psm.decoy,
                            peptides: vec![peptide],
                            pep: 0.0,
                            q: 0.0,
                            q_emp: 0.0,
                            p: 0.0,
                        });
                        if psm.decoy {
                            registry.decoys.insert(name.clone());
                        } else {
                            registry.targets.insert(name.clone());
                        }
                    }
                }
            }
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Protein> {
        self.proteins.get(name)
    }

    pub fn proteins(&self) -> impl Iterator<Item = &Protein> {
        self.proteins.values()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn decoy_count(&self) -> usize {
        self.decoys.len()
    }

    pub fn is_decoy(&self, name: &str) -> bool {
        self.decoys.contains(name)
    }

    pub fn count_targets(&self, names: &[String]) -> usize {
        names.iter().filter(|name| !self.is_decoy(name)).count()
    }

    pub fn count_decoys(&self, names: &[String]) -> usize {
        names.iter().filter(|name| self.is_decoy(name)).count()
    }

    /// Number of target proteins at q-value <= `level`
    pub fn qvalues_below(&self, level: f64) -> usize {
        self.proteins
            .values()
            .filter(|protein| !protein.decoy && protein.q <= level)
            .count()
    }

    /// Number of decoy proteins at q-value <= `level`
    pub fn decoy_qvalues_below(&self, level: f64) -> usize {
        self.proteins
            .values()
            .filter(|protein| protein.decoy && protein.q <= level)
            .count()
    }

    /// Target and decoy names of proteins implicated, via any of their
    /// peptides, at peptide-level q-value <= `threshold`
    pub fn proteins_at_psm_fdr(
        &self,
        threshold: f64,
    ) -> (FnvHashSet<String>, FnvHashSet<String>) {
        let mut targets = FnvHashSet::default();
        let mut decoys = FnvHashSet::default();
        for protein in self.proteins.values() {
            if protein.peptides.iter().any(|peptide| peptide.q <= threshold) {
                if protein.decoy {
                    decoys.insert(protein.name.clone());
                } else {
                    targets.insert(protein.name.clone());
                }
            }
        }
        (targets, decoys)
    }

    /// Store the per-rank statistics onto each protein named by the ranked
    /// list. With `ties_as_one` every member of a tie group shares the
    /// group's index into `stats`; otherwise each protein consumes its own.
    pub fn publish(&mut self, ranked: &[RankedGroup], stats: &RankStatistics, ties_as_one: bool) {
        let mut index = 0;
        for (rank, group) in ranked.iter().enumerate() {
            for name in &group.proteins {
                let ix = if ties_as_one { rank } else { index };
                if let Some(protein) = self.proteins.get_mut(name) {
                    protein.pep = group.pep;
                    protein.q = stats.q[ix];
                    protein.q_emp = stats.q_emp[ix];
                    protein.p = stats.p[ix];
                }
                index += 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn psm(peptide: &str, decoy: bool, proteins: &[&str], q: f64) -> PsmRecord {
        PsmRecord {
            peptide: peptide.into(),
            decoy,
            proteins: proteins.iter().map(|s| s.to_string()).collect(),
            pep: 0.0,
            q,
            p: 0.0,
        }
    }

    #[test]
    fn registry_aggregation() {
        let psms = vec![
            psm("LESLIEK", false, &["P1", "P2"], 0.001),
            psm("EDITHR", false, &["P1"], 0.2),
            psm("KEILSEL", true, &["rev_P1"], 0.5),
        ];
        let registry = ProteinRegistry::from_psms(&psms);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.target_count(), 2);
        assert_eq!(registry.decoy_count(), 1);
        assert_eq!(registry.get("P1").unwrap().peptides.len(), 2);
        assert!(registry.is_decoy("rev_P1"));
        assert!(!registry.is_decoy("P2"));
    }

    #[test]
    fn decoy_flag_fixed_at_first_sight() {
        let psms = vec![
            psm("LESLIEK", false, &["P1"], 0.0),
            psm("KEILSEL", true, &["P1"], 0.0),
        ];
        let registry = ProteinRegistry::from_psms(&psms);
        assert!(!registry.get("P1").unwrap().decoy);
        assert_eq!(registry.target_count(), 1);
        assert_eq!(registry.decoy_count(), 0);
        assert_eq!(registry.get("P1").unwrap().peptides.len(), 2);
    }

    #[test]
    fn group_counting_uses_name_sets() {
        let psms = vec![
            psm("A", false, &["P1", "P2"], 0.0),
            psm("B", true, &["rev_P1"], 0.0),
        ];
        let registry = ProteinRegistry::from_psms(&psms);
        let group = vec!["P1".to_string(), "rev_P1".to_string(), "P2".to_string()];
        assert_eq!(registry.count_targets(&group), 2);
        assert_eq!(registry.count_decoys(&group), 1);
    }

    #[test]
    fn proteins_at_psm_fdr_requires_one_passing_peptide() {
        let psms = vec![
            psm("A", false, &["P1"], 0.001),
            psm("B", false, &["P2"], 0.8),
            psm("C", true, &["rev_P3"], 0.01),
        ];
        let registry = ProteinRegistry::from_psms(&psms);
        let (targets, decoys) = registry.proteins_at_psm_fdr(0.05);
        assert!(targets.contains("P1"));
        assert!(!targets.contains("P2"));
        assert!(decoys.contains("rev_P3"));
    }

    #[test]
    fn publish_indexes_by_tie_mode() {
        let psms = vec![
            psm("A", false, &["P1"], 0.0),
            psm("B", false, &["P2"], 0.0),
            psm("C", true, &["rev_P1"], 0.0),
        ];
        let mut registry = ProteinRegistry::from_psms(&psms);
        let ranked = vec![
            RankedGroup {
                pep: 0.01,
                proteins: vec!["P1".into(), "P2".into()],
            },
            RankedGroup {
                pep: 0.9,
                proteins: vec!["rev_P1".into()],
            },
        ];

        // Per-protein layout: one statistics slot per protein name
        let stats = RankStatistics {
            q: vec![0.01, 0.02, 1.0],
            q_emp: vec![0.0, 0.0, 1.0],
            p: vec![0.5, 0.5, 1.0],
        };
        registry.publish(&ranked, &stats, false);
        assert_eq!(registry.get("P1").unwrap().q, 0.01);
        assert_eq!(registry.get("P2").unwrap().q, 0.02);
        assert_eq!(registry.get("rev_P1").unwrap().q, 1.0);
        assert_eq!(registry.get("P2").unwrap().pep, 0.01);

        // Tie-group layout: one slot per ranked entry
        let stats = RankStatistics {
            q: vec![0.05, 1.0],
            q_emp: vec![0.0, 1.0],
            p: vec![0.5, 1.0],
        };
        registry.publish(&ranked, &stats, true);
        assert_eq!(registry.get("P1").unwrap().q, 0.05);
        assert_eq!(registry.get("P2").unwrap().q, 0.05);
        assert_eq!(registry.get("rev_P1").unwrap().q, 1.0);
    }

    #[test]
    fn qvalue_queries_split_by_label() {
        let psms = vec![
            psm("A", false, &["P1"], 0.0),
            psm("B", true, &["rev_P1"], 0.0),
        ];
        let mut registry = ProteinRegistry::from_psms(&psms);
        let ranked = vec![
            RankedGroup {
                pep: 0.001,
                proteins: vec!["P1".into()],
            },
            RankedGroup {
                pep: 0.002,
                proteins: vec!["rev_P1".into()],
            },
        ];
        let stats = RankStatistics {
            q: vec![0.005, 0.005],
            q_emp: vec![0.0, 0.0],
            p: vec![0.5, 0.5],
        };
        registry.publish(&ranked, &stats, false);
        assert_eq!(registry.qvalues_below(0.01), 1);
        assert_eq!(registry.decoy_qvalues_below(0.01), 1);
        assert_eq!(registry.qvalues_below(0.001), 0);
    }
}
