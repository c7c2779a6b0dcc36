use std::fs::File;
use std::io::BufReader;

use crate::error::{GpcrError, Result};
use crate::types::{FilePath, GeneName, ReceptorClass};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receptor {
    pub gene_name: GeneName,
    pub class: ReceptorClass,
    // the ortholog alignment of this receptor
    pub alignment: FilePath,
    pub conservation_file: FilePath,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub snake_plot: Option<FilePath>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub tree: Option<FilePath>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub num_orthologs: Option<u32>,
    // last common ancestor of the orthologs
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub lca: Option<String>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub gpcrdb_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct Catalog {
    pub receptors: Vec<Receptor>,
}

impl Catalog {
    pub fn read(catalog_file_name: &str) -> Result<Catalog> {
        let file = File::open(catalog_file_name)
            .map_err(|source| GpcrError::Transport {
                path: catalog_file_name.to_owned(),
                source,
            })?;
        let reader = BufReader::new(file);

        serde_json::from_reader(reader)
            .map_err(|source| GpcrError::Catalog {
                path: catalog_file_name.to_owned(),
                source,
            })
    }

    pub fn from_json(text: &str) -> Result<Catalog> {
        serde_json::from_str(text)
            .map_err(|source| GpcrError::Catalog {
                path: "<string>".to_owned(),
                source,
            })
    }

    pub fn len(&self) -> usize {
        self.receptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receptors.is_empty()
    }

    /// Find a receptor by gene name, ignoring case.
    pub fn find(&self, gene_name: &str) -> Option<&Receptor> {
        let gene_name = gene_name.trim();

        if gene_name.is_empty() {
            return None;
        }

        self.receptors.iter()
            .find(|receptor| receptor.gene_name.eq_ignore_ascii_case(gene_name))
    }

    // completion candidates and unknown-name hints, in catalog order
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<GeneName> {
        let prefix = prefix.trim().to_uppercase();

        if prefix.is_empty() {
            return vec![];
        }

        self.receptors.iter()
            .filter(|receptor| receptor.gene_name.to_uppercase().starts_with(&prefix))
            .map(|receptor| receptor.gene_name.clone())
            .collect()
    }
}

// the alignment of the human receptors of one class
pub fn human_alignment_path(alignment_dir: &str, class: &str) -> String {
    format!("{}/class{}_humans_MSA.fasta", alignment_dir.trim_end_matches('/'), class)
}

#[cfg(test)]
const TEST_CATALOG: &str = r#"[
  {
    "geneName": "HTR1A",
    "class": "A",
    "alignment": "alignments/HTR1A_orthologs.fasta",
    "conservationFile": "conservation/HTR1A_conservation.txt",
    "snakePlot": "snakeplots/HTR1A.html",
    "numOrthologs": 212,
    "lca": "Vertebrata"
  },
  {
    "geneName": "HTR1B",
    "class": "A",
    "alignment": "alignments/HTR1B_orthologs.fasta",
    "conservationFile": "conservation/HTR1B_conservation.txt"
  },
  {
    "geneName": "GABBR1",
    "class": "C",
    "alignment": "alignments/GABBR1_orthologs.fasta",
    "conservationFile": "conservation/GABBR1_conservation.txt",
    "gpcrdbId": "gabr1_human"
  }
]"#;

#[test]
fn test_catalog_from_json() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();

    assert_eq!(catalog.len(), 3);

    let htr1a = &catalog.receptors[0];
    assert_eq!(htr1a.class.as_str(), "A");
    assert_eq!(htr1a.num_orthologs, Some(212));
    assert_eq!(htr1a.snake_plot.as_ref().map(|s| s.as_str()), Some("snakeplots/HTR1A.html"));
    assert_eq!(htr1a.tree, None);

    assert_eq!(catalog.receptors[2].gpcrdb_id.as_deref(), Some("gabr1_human"));

    assert!(Catalog::from_json("[{\"geneName\": \"X\"}]").is_err());
}

#[test]
fn test_catalog_find() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();

    assert_eq!(catalog.find("htr1b").unwrap().gene_name.as_str(), "HTR1B");
    assert_eq!(catalog.find(" GABBR1 ").unwrap().class.as_str(), "C");
    assert!(catalog.find("HTR1").is_none());
    assert!(catalog.find("").is_none());
}

#[test]
fn test_names_with_prefix() {
    let catalog = Catalog::from_json(TEST_CATALOG).unwrap();

    let names: Vec<_> = catalog.names_with_prefix("htr").iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["HTR1A", "HTR1B"]);

    assert!(catalog.names_with_prefix("ADR").is_empty());
    assert!(catalog.names_with_prefix("").is_empty());
}

#[test]
fn test_human_alignment_path() {
    assert_eq!(human_alignment_path("alignments", "A"), "alignments/classA_humans_MSA.fasta");
    assert_eq!(human_alignment_path("data/", "C"), "data/classC_humans_MSA.fasta");
}
