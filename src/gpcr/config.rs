use std::fs::File;
use std::io::BufReader;

use crate::bio::classify::Category;
use crate::constants::*;
use crate::error::{GpcrError, Result};
use crate::types::{Colour, FilePath};

// fill colours for the comparison categories on a snake plot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CategoryColours {
    pub common: Colour,
    pub specific_both: Colour,
    pub specific1: Colour,
    pub specific2: Colour,
}

impl Default for CategoryColours {
    fn default() -> CategoryColours {
        CategoryColours {
            common: DEFAULT_COMMON_COLOUR.into(),
            specific_both: DEFAULT_SPECIFIC_BOTH_COLOUR.into(),
            specific1: DEFAULT_SPECIFIC1_COLOUR.into(),
            specific2: DEFAULT_SPECIFIC2_COLOUR.into(),
        }
    }
}

impl CategoryColours {
    pub fn colour_of(&self, category: Category) -> &Colour {
        match category {
            Category::Common => &self.common,
            Category::SpecificBoth => &self.specific_both,
            Category::Specific1 => &self.specific1,
            Category::Specific2 => &self.specific2,
        }
    }
}

fn default_alignment_dir() -> FilePath {
    DEFAULT_ALIGNMENT_DIR.into()
}

fn default_catalog_file() -> FilePath {
    DEFAULT_CATALOG_FILE.into()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_conservation_fill_colour() -> Colour {
    DEFAULT_CONSERVATION_FILL_COLOUR.into()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    // holds the per-class human alignments, eg. classA_humans_MSA.fasta
    #[serde(default = "default_alignment_dir")]
    pub alignment_dir: FilePath,
    #[serde(default = "default_catalog_file")]
    pub catalog_file: FilePath,
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    #[serde(default)]
    pub category_colours: CategoryColours,
    #[serde(default = "default_conservation_fill_colour")]
    pub conservation_fill_colour: Colour,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            alignment_dir: default_alignment_dir(),
            catalog_file: default_catalog_file(),
            default_threshold: default_threshold(),
            category_colours: CategoryColours::default(),
            conservation_fill_colour: default_conservation_fill_colour(),
        }
    }
}

impl Config {
    pub fn read(config_file_name: &str) -> Result<Config> {
        let file = File::open(config_file_name)
            .map_err(|source| GpcrError::Transport {
                path: config_file_name.to_owned(),
                source,
            })?;
        let reader = BufReader::new(file);

        serde_json::from_reader(reader)
            .map_err(|source| GpcrError::Config {
                path: config_file_name.to_owned(),
                source,
            })
    }

    pub fn from_json(text: &str) -> Result<Config> {
        serde_json::from_str(text)
            .map_err(|source| GpcrError::Config {
                path: "<string>".to_owned(),
                source,
            })
    }
}

#[test]
fn test_config_defaults() {
    let config = Config::from_json("{}").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.alignment_dir.as_str(), "alignments");
    assert_eq!(config.default_threshold, 50.0);
    assert_eq!(config.category_colours.colour_of(Category::SpecificBoth).as_str(), "#A85638");
}

#[test]
fn test_config_overrides() {
    let json = r##"{
        "alignment_dir": "data/msa",
        "default_threshold": 80,
        "category_colours": {
            "common": "#000000",
            "specific_both": "#111111",
            "specific1": "#222222",
            "specific2": "#333333"
        }
    }"##;
    let config = Config::from_json(json).unwrap();

    assert_eq!(config.alignment_dir.as_str(), "data/msa");
    assert_eq!(config.catalog_file.as_str(), "receptors.json");
    assert_eq!(config.default_threshold, 80.0);
    assert_eq!(config.category_colours.colour_of(Category::Specific2).as_str(), "#333333");

    assert!(Config::from_json("{\"default_threshold\": \"high\"}").is_err());
}
