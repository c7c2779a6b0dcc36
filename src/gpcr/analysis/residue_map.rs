use std::collections::{HashMap, HashSet};

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::bio::conservation::{parse_conservation, ConservationTable};
use crate::bio::fasta::{parse_alignment, SequenceRecord};
use crate::bio::mapping::{map_coordinates, Position};
use crate::catalog::{human_alignment_path, Catalog, Receptor};
use crate::constants::MISSING_VALUE;
use crate::error::{GpcrError, Result};
use crate::export::Table;
use crate::fetch::read_source;
use crate::types::{AminoAcid, GeneName, RegionName, ResidueNumber, TopologyLabel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueCell {
    pub position: Position,
    pub residue: char,
    // eg. "93.40%", or "-" without conservation data
    pub conservation: String,
    pub conserved_residue: AminoAcid,
}

impl ResidueCell {
    fn residue_text(&self) -> String {
        if self.position.is_gap() {
            MISSING_VALUE.to_owned()
        } else {
            self.residue.to_string()
        }
    }
}

// One row per reference residue.  `cells` has one entry per receptor,
// the reference first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueRow {
    pub reference_residue: ResidueNumber,
    pub region: RegionName,
    pub topology_label: TopologyLabel,
    pub cells: Vec<ResidueCell>,
}

fn make_cell(position: Position, residue: char, conservation: Option<&ConservationTable>)
    -> ResidueCell
{
    let row = position.number()
        .and_then(|number| conservation.and_then(|table| table.get(&number)));

    match row {
        Some(row) => ResidueCell {
            position,
            residue,
            conservation: format!("{:.2}%", row.conservation_percent),
            conserved_residue: row.conserved_residue.clone(),
        },
        None => ResidueCell {
            position,
            residue,
            conservation: MISSING_VALUE.to_owned(),
            conserved_residue: MISSING_VALUE.into(),
        },
    }
}

/// Map the reference (first record) and target receptors column by
/// column and keep the columns where the reference has a residue.
/// Conservation tables are looked up by sequence identifier; receptors
/// without one get "-" cells.
pub fn map_residues_all_receptors(records: &[SequenceRecord],
                                  conservation: &HashMap<GeneName, ConservationTable>)
    -> Result<Vec<ResidueRow>>
{
    let map = map_coordinates(records)?;

    let tables: Vec<Option<&ConservationTable>> = records.iter()
        .map(|record| conservation.get(&record.identifier))
        .collect();

    let rows = map.entries.iter()
        .filter_map(|entry| {
            let reference_residue = entry.positions[0].number()?;

            let cells: Vec<ResidueCell> = entry.positions.iter()
                .zip(entry.residues.iter())
                .zip(tables.iter())
                .map(|((position, residue), table)| make_cell(*position, *residue, *table))
                .collect();

            let reference_row = tables[0].and_then(|table| table.get(&reference_residue));

            let (region, topology_label) =
                match reference_row {
                    Some(row) => (row.region.clone(), row.topology_label.clone()),
                    None => (MISSING_VALUE.into(), MISSING_VALUE.into()),
                };

            Some(ResidueRow {
                reference_residue,
                region,
                topology_label,
                cells,
            })
        })
        .collect();

    Ok(rows)
}

/// Keep the rows for the given reference residue numbers.  An empty set
/// keeps everything.
pub fn filter_reference_residues(rows: Vec<ResidueRow>, numbers: &HashSet<ResidueNumber>)
    -> Vec<ResidueRow>
{
    if numbers.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| numbers.contains(&row.reference_residue))
        .collect()
}

fn non_empty_or_missing(text: &str) -> String {
    if text.is_empty() {
        MISSING_VALUE.to_owned()
    } else {
        text.to_owned()
    }
}

pub fn residue_table(rows: &[ResidueRow], names: &[GeneName], include_conservation: bool)
    -> Table
{
    let mut headers = vec![];

    if include_conservation {
        if let Some(reference_name) = names.first() {
            headers.push(format!("{}_Region", reference_name));
            headers.push(format!("{}_GPCRdb", reference_name));
        }
    }

    for name in names {
        headers.push(format!("{}_resNum", name));
        headers.push(format!("{}_AA", name));
        headers.push(format!("{}_Conservation (%)", name));
        headers.push(format!("{}_Conserved_AA", name));
    }

    let mut table = Table::new(headers);

    for row in rows {
        let mut cells = vec![];

        if include_conservation && !names.is_empty() {
            cells.push(non_empty_or_missing(&row.region));
            cells.push(non_empty_or_missing(&row.topology_label));
        }

        for cell in row.cells.iter().take(names.len()) {
            cells.push(cell.position.number()
                       .map(|number| number.to_string())
                       .unwrap_or_else(|| MISSING_VALUE.to_owned()));
            cells.push(cell.residue_text());
            cells.push(cell.conservation.clone());
            cells.push(non_empty_or_missing(&cell.conserved_residue));
        }

        cells.resize(table.headers.len(), MISSING_VALUE.to_owned());
        table.rows.push(cells);
    }

    table
}

/// Parse a comma separated list of positive residue numbers.  Repeats
/// are ignored.
pub fn parse_residue_numbers(text: &str) -> std::result::Result<HashSet<ResidueNumber>, String> {
    text.split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| {
            match part.parse::<ResidueNumber>() {
                Ok(number) if number > 0 => Ok(number),
                _ => Err(format!("not a positive residue number: {}", part)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueMap {
    pub gene_names: Vec<GeneName>,
    pub rows: Vec<ResidueRow>,
}

/// Look up the reference and target receptors, which must all be known,
/// distinct from the reference and in the reference's class.
pub fn select_receptor_set<'a>(catalog: &'a Catalog, reference: &str, targets: &[&str])
    -> Result<Vec<&'a Receptor>>
{
    let reference_name = reference.trim();
    let reference = catalog.find(reference_name)
        .ok_or_else(|| GpcrError::ReceptorNotFound(reference_name.to_owned()))?;

    let mut receptors = vec![reference];

    for target in targets.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let receptor = catalog.find(target)
            .ok_or_else(|| GpcrError::ReceptorNotFound(target.to_owned()))?;

        if receptor.gene_name == reference.gene_name {
            return Err(GpcrError::SameReceptor(receptor.gene_name.clone()));
        }

        if receptor.class != reference.class {
            return Err(GpcrError::ClassMismatch {
                first: reference.class.clone(),
                second: receptor.class.clone(),
            });
        }

        receptors.push(receptor);
    }

    if receptors.len() < 2 {
        return Err(GpcrError::PairRequired { found: receptors.len() });
    }

    Ok(receptors)
}

pub fn residue_map_from_texts(alignment_text: &str, receptors: &[&Receptor],
                              conservation: &HashMap<GeneName, ConservationTable>)
    -> Result<ResidueMap>
{
    let alignment = parse_alignment(alignment_text, None);

    let records = receptors.iter()
        .map(|receptor| {
            alignment.get(receptor.gene_name.as_str())
                .filter(|record| !record.is_empty())
                .cloned()
                .ok_or_else(|| GpcrError::SequenceNotFound(receptor.gene_name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = map_residues_all_receptors(&records, conservation)?;

    info!("{} residues mapped for {}", rows.len(), receptors[0].gene_name);

    Ok(ResidueMap {
        gene_names: receptors.iter().map(|r| r.gene_name.clone()).collect(),
        rows,
    })
}

/// Read the class alignment and, if requested, every receptor's
/// conservation file, all concurrently.  A conservation file that can't be
/// read is logged and treated as empty.
pub async fn load_residue_map(catalog: &Catalog, alignment_dir: &str, reference: &str,
                              targets: &[&str], include_conservation: bool)
    -> Result<ResidueMap>
{
    let receptors = select_receptor_set(catalog, reference, targets)?;

    let alignment_path = human_alignment_path(alignment_dir, &receptors[0].class);

    let mut join_set = JoinSet::new();

    if include_conservation {
        for receptor in &receptors {
            let gene_name = receptor.gene_name.clone();
            let path = receptor.conservation_file.to_string();
            join_set.spawn(async move {
                (gene_name, read_source(&path).await)
            });
        }
    }

    let read_conservation = async move {
        let mut conservation = HashMap::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((gene_name, Ok(text))) => {
                    conservation.insert(gene_name, parse_conservation(&text));
                },
                Ok((gene_name, Err(err))) => {
                    warn!("conservation data for {} could not be loaded: {}", gene_name, err);
                },
                Err(err) => warn!("conservation read failed: {}", err),
            }
        }

        conservation
    };

    let (alignment_text, conservation) =
        tokio::join!(read_source(&alignment_path), read_conservation);

    residue_map_from_texts(&alignment_text?, &receptors, &conservation)
}

#[cfg(test)]
fn test_records() -> Vec<SequenceRecord> {
    vec![SequenceRecord::new("REF", "ref", "M-KW-V"),
         SequenceRecord::new("T1", "t1", "MQ-WLV"),
         SequenceRecord::new("T2", "t2", "--RW-I")]
}

#[test]
fn test_map_residues_all_receptors() {
    let mut conservation = HashMap::new();
    conservation.insert(GeneName::from("REF"),
                        parse_conservation("1\t90.5\tM\tM\tN-term\t-\n\
                                            2\t60\tK/R\tK\tTM1\t1.30\n\
                                            3\t99\tW\tW\tTM1\t1.31\n"));
    conservation.insert(GeneName::from("T2"), parse_conservation("2\t40\tW\n"));

    let rows = map_residues_all_receptors(&test_records(), &conservation).unwrap();

    let reference_numbers: Vec<_> = rows.iter().map(|row| row.reference_residue).collect();
    assert_eq!(reference_numbers, vec![1, 2, 3, 4]);

    let row = &rows[1];
    assert_eq!(row.region.as_str(), "TM1");
    assert_eq!(row.topology_label.as_str(), "1.30");
    assert_eq!(row.cells[0].conservation, "60.00%");
    assert_eq!(row.cells[0].conserved_residue.as_str(), "K/R");
    assert_eq!(row.cells[1].position, Position::Gap);
    assert_eq!(row.cells[2].position, Position::Residue(1));
    assert_eq!(row.cells[2].conservation, "-");

    let row = &rows[2];
    assert_eq!(row.cells[2].position, Position::Residue(2));
    assert_eq!(row.cells[2].conservation, "40.00%");

    // no conservation row for reference residue 4
    assert_eq!(rows[3].region.as_str(), "-");
    assert_eq!(rows[3].cells[1].position, Position::Residue(5));
}

#[test]
fn test_filter_reference_residues() {
    let rows = map_residues_all_receptors(&test_records(), &HashMap::new()).unwrap();

    let numbers: HashSet<ResidueNumber> = [2, 4, 17].into_iter().collect();
    let filtered = filter_reference_residues(rows.clone(), &numbers);
    let kept: Vec<_> = filtered.iter().map(|row| row.reference_residue).collect();
    assert_eq!(kept, vec![2, 4]);

    assert_eq!(filter_reference_residues(rows.clone(), &HashSet::new()), rows);
}

#[test]
fn test_residue_table() {
    let mut conservation = HashMap::new();
    conservation.insert(GeneName::from("REF"),
                        parse_conservation("1\t90.5\tM\tM\tN-term\t-\n3\t99\tW\tW\t\n"));

    let rows = map_residues_all_receptors(&test_records(), &conservation).unwrap();
    let names: Vec<GeneName> = vec!["REF".into(), "T1".into(), "T2".into()];

    let table = residue_table(&rows, &names, true);
    assert_eq!(table.headers[..6],
               ["REF_Region", "REF_GPCRdb", "REF_resNum", "REF_AA",
                "REF_Conservation (%)", "REF_Conserved_AA"]);
    assert_eq!(table.headers.len(), 14);
    assert_eq!(table.rows[0][..6], ["N-term", "-", "1", "M", "90.50%", "M"]);
    assert_eq!(table.rows[0][10..], ["-", "-", "-", "-"]);
    assert_eq!(table.column("T2_AA").unwrap(), vec!["-", "R", "W", "I"]);

    let plain = residue_table(&rows, &names, false);
    assert_eq!(plain.headers[0], "REF_resNum");
    assert_eq!(plain.rows[2][..4], ["3", "W", "99.00%", "W"]);
}

#[test]
fn test_parse_residue_numbers() {
    let numbers = parse_residue_numbers("3, 50,3,,").unwrap();
    let expected: HashSet<ResidueNumber> = [3, 50].into_iter().collect();
    assert_eq!(numbers, expected);

    assert!(parse_residue_numbers("0").is_err());
    assert!(parse_residue_numbers("3.50").is_err());
    assert!(parse_residue_numbers("").unwrap().is_empty());
}

#[test]
fn test_select_receptor_set() {
    let catalog = Catalog::from_json(r#"[
      {"geneName": "REF", "class": "A", "alignment": "r.fasta", "conservationFile": "r.txt"},
      {"geneName": "T1", "class": "A", "alignment": "t1.fasta", "conservationFile": "t1.txt"},
      {"geneName": "T9", "class": "F", "alignment": "t9.fasta", "conservationFile": "t9.txt"}
    ]"#).unwrap();

    let receptors = select_receptor_set(&catalog, "ref", &["t1"]).unwrap();
    assert_eq!(receptors.len(), 2);

    assert!(matches!(select_receptor_set(&catalog, "REF", &["REF"]),
                     Err(GpcrError::SameReceptor(_))));
    assert!(matches!(select_receptor_set(&catalog, "REF", &["T9"]),
                     Err(GpcrError::ClassMismatch { .. })));
    assert!(matches!(select_receptor_set(&catalog, "REF", &[]),
                     Err(GpcrError::PairRequired { found: 1 })));
    assert!(matches!(select_receptor_set(&catalog, "X", &["T1"]),
                     Err(GpcrError::ReceptorNotFound(_))));
}
