use itertools::Itertools;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::bio::fasta::{parse_alignment, parse_ortholog_alignment, SequenceRecord};
use crate::bio::reproject::{reproject_ortholog, ReprojectionMode};
use crate::bio::trim::{keep_reference_columns, trim_all_gap_columns};
use crate::catalog::{human_alignment_path, Catalog, Receptor};
use crate::constants::COMBINED_ORTHOLOGS_FILE_SUFFIX;
use crate::error::{GpcrError, Result};
use crate::fetch::read_source;
use crate::types::GeneName;

/// Look up the receptors to combine.  Names are trimmed, blank names are
/// ignored and repeats are dropped, keeping the first occurrence.  Every
/// receptor must be in the catalog and all must share a class.
pub fn select_receptors<'a>(catalog: &'a Catalog, names: &[&str]) -> Result<Vec<&'a Receptor>> {
    let mut receptors: Vec<&Receptor> = vec![];

    for name in names.iter().map(|name| name.trim()).filter(|name| !name.is_empty()) {
        let receptor = catalog.find(name)
            .ok_or_else(|| GpcrError::ReceptorNotFound(name.to_owned()))?;

        if !receptors.iter().any(|r| r.gene_name == receptor.gene_name) {
            receptors.push(receptor);
        }
    }

    let Some(first) = receptors.first() else {
        return Err(GpcrError::NoSequences);
    };

    if let Some(other) = receptors.iter().find(|r| r.class != first.class) {
        return Err(GpcrError::ClassMismatch {
            first: first.class.clone(),
            second: other.class.clone(),
        });
    }

    Ok(receptors)
}

/// Pull the selected receptors out of their class alignment and remove
/// the columns where all of them have a gap.  The records are returned in
/// the order of `receptors`.
pub fn prepare_reference(alignment_text: &str, receptors: &[&Receptor])
    -> Result<Vec<SequenceRecord>>
{
    let keep: Vec<&str> = receptors.iter().map(|r| r.gene_name.as_str()).collect();
    let alignment = parse_alignment(alignment_text, Some(keep.as_slice()));

    let sequences = receptors.iter()
        .map(|receptor| {
            alignment.get(receptor.gene_name.as_str())
                .filter(|record| !record.is_empty())
                .cloned()
                .ok_or_else(|| GpcrError::SequenceNotFound(receptor.gene_name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let sequences =
        if sequences.len() >= 2 {
            trim_all_gap_columns(&sequences)?.sequences
        } else {
            debug!("single sequence, no column trimming");
            sequences
        };

    if sequences.iter().all(|seq| seq.is_empty()) {
        return Err(GpcrError::AllPositionsTrimmed);
    }

    for seq in &sequences {
        if seq.ungapped_len() == 0 {
            warn!("no residues remain for {}", seq.identifier);
        }
    }

    Ok(sequences)
}

/// Lay the records of one receptor's ortholog alignment out against that
/// receptor's trimmed reference sequence.  Returns None if the alignment
/// has no record with the reference's header.
pub fn project_orthologs(reference: &SequenceRecord, ortholog_text: &str,
                         mode: ReprojectionMode)
    -> Option<Vec<SequenceRecord>>
{
    let orthologs = parse_ortholog_alignment(ortholog_text);

    let Some(human) = orthologs.iter().find(|seq| seq.header == reference.header) else {
        warn!("sequence with header \"{}\" not found in the ortholog alignment for {}",
              reference.header, reference.identifier);
        return None;
    };

    let kept = keep_reference_columns(&orthologs, human);

    debug!("{}: {} of the ortholog alignment columns are human residues",
           reference.identifier, kept.retained_columns.len());

    Some(kept.sequences.iter()
         .map(|seq| {
             let residues = reproject_ortholog(&reference.residues, &seq.residues, mode);
             seq.with_residues(residues)
         })
         .collect())
}

/// Re-project the ortholog alignments of each reference record, in order.
/// A receptor whose alignment couldn't be read or doesn't contain its
/// reference sequence is skipped.
pub fn combine_orthologs(references: &[SequenceRecord], ortholog_texts: &[Result<String>],
                         mode: ReprojectionMode)
    -> Vec<SequenceRecord>
{
    let mut combined = vec![];

    for (reference, ortholog_text) in references.iter().zip(ortholog_texts) {
        let ortholog_text =
            match ortholog_text {
                Ok(text) => text,
                Err(err) => {
                    warn!("skipping orthologs of {}: {}", reference.identifier, err);
                    continue;
                }
            };

        if let Some(records) = project_orthologs(reference, ortholog_text, mode) {
            info!("{}: {} ortholog sequences", reference.identifier, records.len());
            combined.extend(records);
        }
    }

    combined
}

pub fn combined_file_name(gene_names: &[GeneName]) -> String {
    format!("{}{}", gene_names.iter().join("-"), COMBINED_ORTHOLOGS_FILE_SUFFIX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedOrthologs {
    pub gene_names: Vec<GeneName>,
    pub file_name: String,
    pub records: Vec<SequenceRecord>,
}

async fn read_ortholog_alignments(receptors: &[&Receptor]) -> Vec<Result<String>> {
    let mut join_set = JoinSet::new();

    for (index, receptor) in receptors.iter().enumerate() {
        let path = receptor.alignment.to_string();
        join_set.spawn(async move {
            (index, read_source(&path).await)
        });
    }

    let mut texts: Vec<Result<String>> = receptors.iter()
        .map(|receptor| Err(GpcrError::Transport {
            path: receptor.alignment.to_string(),
            source: std::io::Error::other("read task didn't complete"),
        }))
        .collect();

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => texts[index] = result,
            Err(err) => warn!("ortholog alignment read failed: {}", err),
        }
    }

    texts
}

/// Build the combined ortholog alignment for the named receptors.  The
/// class alignment is read first, then all ortholog alignments at once.
pub async fn load_combined_orthologs(catalog: &Catalog, alignment_dir: &str, names: &[&str],
                                     mode: ReprojectionMode)
    -> Result<CombinedOrthologs>
{
    let receptors = select_receptors(catalog, names)?;

    let alignment_path = human_alignment_path(alignment_dir, &receptors[0].class);
    let alignment_text = read_source(&alignment_path).await?;

    let references = prepare_reference(&alignment_text, &receptors)?;

    let ortholog_texts = read_ortholog_alignments(&receptors).await;

    let records = combine_orthologs(&references, &ortholog_texts, mode);

    let gene_names: Vec<GeneName> =
        receptors.iter().map(|receptor| receptor.gene_name.clone()).collect();

    Ok(CombinedOrthologs {
        file_name: combined_file_name(&gene_names),
        gene_names,
        records,
    })
}

#[cfg(test)]
const TEST_CATALOG: &str = r#"[
  {"geneName": "RECA", "class": "A", "alignment": "a.fasta", "conservationFile": "a.txt"},
  {"geneName": "RECB", "class": "A", "alignment": "b.fasta", "conservationFile": "b.txt"},
  {"geneName": "RECC", "class": "C", "alignment": "c.fasta", "conservationFile": "c.txt"}
]"#;

#[test]
fn test_select_receptors() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();

    let receptors = select_receptors(&catalog, &[" recb", "RECA ", "", "RECB"]).unwrap();
    let names: Vec<_> = receptors.iter().map(|r| r.gene_name.as_str()).collect();
    assert_eq!(names, vec!["RECB", "RECA"]);

    assert!(matches!(select_receptors(&catalog, &[]), Err(GpcrError::NoSequences)));
    assert!(matches!(select_receptors(&catalog, &[" "]), Err(GpcrError::NoSequences)));
    assert!(matches!(select_receptors(&catalog, &["RECA", "NOPE"]),
                     Err(GpcrError::ReceptorNotFound(_))));
    assert!(matches!(select_receptors(&catalog, &["RECA", "RECC"]),
                     Err(GpcrError::ClassMismatch { .. })));
}

#[cfg(test)]
const TEST_CLASS_ALIGNMENT: &str = "\
>sp|P1|RECA_HUMAN/1-4
-MK--V
>sp|P2|RECB_HUMAN/1-4
-M-R-V
>sp|P3|RECC_HUMAN/1-6
QMKRLV
";

#[test]
fn test_prepare_reference() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();
    let receptors = select_receptors(&catalog, &["RECA", "RECB"]).unwrap();

    let references = prepare_reference(TEST_CLASS_ALIGNMENT, &receptors).unwrap();

    assert_eq!(references.len(), 2);
    assert_eq!(references[0].residues, "MK-V");
    assert_eq!(references[1].residues, "M-RV");
    assert_eq!(references[0].header.as_str(), "sp|P1|RECA_HUMAN");

    let single = select_receptors(&catalog, &["RECB"]).unwrap();
    let references = prepare_reference(TEST_CLASS_ALIGNMENT, &single).unwrap();
    assert_eq!(references[0].residues, "-M-R-V");
}

#[test]
fn test_prepare_reference_errors() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();
    let receptors = select_receptors(&catalog, &["RECA", "RECB"]).unwrap();

    let missing = ">sp|P1|RECA_HUMAN\nMK\n";
    assert!(matches!(prepare_reference(missing, &receptors),
                     Err(GpcrError::SequenceNotFound(ref name)) if name.as_str() == "RECB"));

    let all_gaps = ">sp|P1|RECA_HUMAN\n---\n>sp|P2|RECB_HUMAN\n---\n";
    assert!(matches!(prepare_reference(all_gaps, &receptors),
                     Err(GpcrError::AllPositionsTrimmed)));
}

#[test]
fn test_project_orthologs() {
    let reference = SequenceRecord::new("RECA", "sp|P1|RECA_HUMAN", "MK-V");
    let ortholog_text = "\
>sp|P1|RECA_HUMAN
-MK-V
>RECA_MOUSE Mus musculus
-MRAV
>RECA_DANRE
SM--V
";

    let projected =
        project_orthologs(&reference, ortholog_text, ReprojectionMode::Sequential).unwrap();

    let residues: Vec<_> = projected.iter().map(|seq| seq.residues.as_str()).collect();
    assert_eq!(residues, vec!["MK-V", "MR-V", "M--V"]);
    assert_eq!(projected[1].header.as_str(), "RECA_MOUSE Mus musculus");
    assert_eq!(projected[1].identifier.as_str(), "RECA_MOUSE");

    let no_match = ">sp|P1|RECA_HUMAN/1-4\nMKV\n";
    assert!(project_orthologs(&reference, no_match, ReprojectionMode::Sequential).is_none());
}

#[test]
fn test_combine_orthologs_skips_failures() {
    let references = vec![SequenceRecord::new("RECA", "sp|P1|RECA_HUMAN", "MK-V"),
                          SequenceRecord::new("RECB", "sp|P2|RECB_HUMAN", "M-RV")];

    let texts = vec![
        Err(GpcrError::Transport {
            path: "a.fasta".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        }),
        Ok(">sp|P2|RECB_HUMAN\nMRV\n>RECB_MOUSE\nMQI\n".to_owned()),
    ];

    let combined = combine_orthologs(&references, &texts, ReprojectionMode::Sequential);
    let residues: Vec<_> = combined.iter().map(|seq| seq.residues.as_str()).collect();
    assert_eq!(residues, vec!["M-RV", "M-QI"]);
}

#[test]
fn test_combined_file_name() {
    let names: Vec<GeneName> = vec!["RECA".into(), "RECB".into()];
    assert_eq!(combined_file_name(&names), "RECA-RECB_orthologs_combined.fasta");
}
