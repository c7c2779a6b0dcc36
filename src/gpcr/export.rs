use std::io;
use std::str::FromStr;

use itertools::Itertools;

use crate::bio::fasta::SequenceRecord;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comma" | "csv" | "," => Ok(Delimiter::Comma),
            "tab" | "tsv" | "\t" => Ok(Delimiter::Tab),
            _ => Err(format!("unknown delimiter \"{}\", expected \"comma\" or \"tab\"", s)),
        }
    }
}

// a header row and string cells, ready for export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Table {
        Table {
            headers,
            rows: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }
}

pub fn write_delimited(writer: &mut dyn io::Write, table: &Table, delimiter: Delimiter)
    -> Result<()>
{
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .from_writer(writer);

    csv_writer.write_record(&table.headers)?;

    for row in &table.rows {
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;

    Ok(())
}

/// Rebuild FASTA text from records, one unwrapped line per sequence.
pub fn format_fasta_records(records: &[SequenceRecord]) -> String {
    records.iter()
        .map(|record| format!(">{}\n{}", record.header, record.residues))
        .join("\n")
}

#[test]
fn test_write_delimited() {
    let mut table = Table::new(vec!["Residue #".into(), "Category".into()]);
    table.rows.push(vec!["12".into(), "Common Residues".into()]);
    table.rows.push(vec!["-".into(), "a, b".into()]);

    let mut out: Vec<u8> = vec![];
    write_delimited(&mut out, &table, Delimiter::Comma).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(),
               "Residue #,Category\n12,Common Residues\n-,\"a, b\"\n");

    let mut out: Vec<u8> = vec![];
    write_delimited(&mut out, &table, Delimiter::Tab).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(),
               "Residue #\tCategory\n12\tCommon Residues\n-\ta, b\n");

    assert_eq!(table.column("Category").unwrap(), vec!["Common Residues", "a, b"]);
}

#[test]
fn test_delimiter_from_str() {
    assert_eq!("tab".parse::<Delimiter>().unwrap(), Delimiter::Tab);
    assert_eq!("Comma".parse::<Delimiter>().unwrap(), Delimiter::Comma);
    assert!("pipe".parse::<Delimiter>().is_err());
}

#[test]
fn test_format_fasta_records() {
    let records = vec![SequenceRecord::new("A", "sp|P1|A_HUMAN", "MK-V"),
                       SequenceRecord::new("B", "B_MOUSE mouse", "MKQV")];

    assert_eq!(format_fasta_records(&records),
               ">sp|P1|A_HUMAN\nMK-V\n>B_MOUSE mouse\nMKQV");
    assert_eq!(format_fasta_records(&[]), "");
}
