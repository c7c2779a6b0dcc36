use std::f64::consts::PI;
use std::str::FromStr;

use crate::bio::classify::{Category, ClassificationEntry};
use crate::bio::conservation::ConservationTable;
use crate::config::CategoryColours;
use crate::constants::FILL_BISECTION_ROUNDS;
use crate::error::GpcrError;
use crate::export::Table;
use crate::types::{Colour, ResidueNumber};

// which receptor of a pairwise comparison a snake plot is drawn for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl FromStr for Side {
    type Err = GpcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Side::First),
            "2" => Ok(Side::Second),
            _ => Err(GpcrError::InvalidSide(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFill {
    pub residue_number: ResidueNumber,
    pub colour: Colour,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConservationFill {
    pub residue_number: ResidueNumber,
    // percentage from the top of the residue circle where the fill starts
    pub offset: f64,
    pub colour: Colour,
}

// area of the segment of height h cut from the bottom of a unit circle
fn segment_area(h: f64) -> f64 {
    (1.0 - h).acos() - (1.0 - h) * (2.0 * h - h * h).sqrt()
}

/// Return the gradient boundary, as a percentage offset from the top of a
/// residue circle, that fills conservation% of the circle's area from the
/// bottom.  Equal steps in conservation give equal steps in filled area.
pub fn fill_boundary_offset(conservation: f64) -> f64 {
    let target_area = conservation.clamp(0.0, 100.0) / 100.0 * PI;

    let mut low = 0.0;
    let mut high = 2.0;
    let mut mid = 1.0;

    for _ in 0..FILL_BISECTION_ROUNDS {
        mid = (low + high) / 2.0;
        if segment_area(mid) < target_area {
            low = mid;
        } else {
            high = mid;
        }
    }

    (2.0 - mid) / 2.0 * 100.0
}

pub fn category_fills(entries: &[ClassificationEntry], side: Side, colours: &CategoryColours)
    -> Vec<CategoryFill>
{
    entries.iter()
        .filter_map(|entry| {
            let residue_side =
                match side {
                    Side::First => &entry.a,
                    Side::Second => &entry.b,
                };

            let residue_number = residue_side.position.number()?;

            Some(CategoryFill {
                residue_number,
                colour: colours.colour_of(entry.category).clone(),
                category: entry.category,
            })
        })
        .collect()
}

pub fn conservation_fills(table: &ConservationTable, colour: &Colour) -> Vec<ConservationFill> {
    table.values()
        .map(|row| ConservationFill {
            residue_number: row.residue_number,
            offset: fill_boundary_offset(row.conservation_percent),
            colour: colour.clone(),
        })
        .collect()
}

pub fn category_fill_table(fills: &[CategoryFill]) -> Table {
    let mut table = Table::new(vec!["Residue #".into(), "Colour".into(), "Category".into()]);

    for fill in fills {
        table.rows.push(vec![fill.residue_number.to_string(), fill.colour.to_string(),
                             fill.category.to_string()]);
    }

    table
}

// the gradient runs from the top of the circle to the offset with no fill,
// then in the colour down to the bottom
pub fn conservation_fill_table(fills: &[ConservationFill]) -> Table {
    let mut table = Table::new(vec!["Residue #".into(), "Offset %".into(), "Colour".into()]);

    for fill in fills {
        table.rows.push(vec![fill.residue_number.to_string(), format!("{:.2}", fill.offset),
                             fill.colour.to_string()]);
    }

    table
}

#[cfg(test)]
fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 0.01, "{} is not close to {}", actual, expected);
}

#[test]
fn test_fill_boundary_offset() {
    assert_close(fill_boundary_offset(0.0), 100.0);
    assert_close(fill_boundary_offset(50.0), 50.0);
    assert_close(fill_boundary_offset(100.0), 0.0);

    // a quarter of the area sits well below the quarter height mark
    let quarter = fill_boundary_offset(25.0);
    assert!(quarter > 50.0 && quarter < 75.0);
    assert_close(fill_boundary_offset(75.0), 100.0 - quarter);
}

#[test]
fn test_fill_boundary_offset_monotonic() {
    let offsets: Vec<f64> = (0..=10).map(|i| fill_boundary_offset(i as f64 * 10.0)).collect();

    for pair in offsets.windows(2) {
        assert!(pair[1] < pair[0]);
    }
}

#[test]
fn test_category_fills() {
    use crate::bio::classify::ResidueSide;
    use crate::bio::mapping::Position;

    let side = |number: usize, residue: &str, conservation: f64| ResidueSide {
        position: Position::Residue(number),
        residue: residue.into(),
        conservation,
    };

    let entries = vec![
        ClassificationEntry {
            category: Category::Common,
            column: 0,
            a: side(10, "K", 90.0),
            b: side(12, "R", 80.0),
        },
        ClassificationEntry {
            category: Category::Specific2,
            column: 3,
            a: ResidueSide::gap(),
            b: side(15, "W", 70.0),
        },
    ];

    let colours = CategoryColours::default();

    let first = category_fills(&entries, Side::First, &colours);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].residue_number, 10);
    assert_eq!(first[0].colour.as_str(), "#E6E6FA");

    let second = category_fills(&entries, Side::Second, &colours);
    let summary: Vec<_> = second.iter()
        .map(|fill| (fill.residue_number, fill.colour.as_str(), fill.category))
        .collect();
    assert_eq!(summary, vec![(12, "#E6E6FA", Category::Common),
                             (15, "#8F9871", Category::Specific2)]);

    assert_eq!("2".parse::<Side>().unwrap(), Side::Second);
    assert!("3".parse::<Side>().is_err());
}

#[test]
fn test_conservation_fills() {
    use crate::bio::conservation::parse_conservation;

    let table = parse_conservation("2\t50\tK\n1\t100\tM\n");
    let colour: Colour = "#123456".into();
    let fills = conservation_fills(&table, &colour);

    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].residue_number, 1);
    assert_close(fills[0].offset, 0.0);
    assert_close(fills[1].offset, 50.0);
    assert_eq!(fills[1].colour.as_str(), "#123456");

    let fill_table = conservation_fill_table(&fills);
    assert_eq!(fill_table.headers, vec!["Residue #", "Offset %", "Colour"]);
    assert_eq!(fill_table.rows[1], vec!["2", "50.00", "#123456"]);
}
