use std::path::PathBuf;

use gpcr::catalog::Catalog;

pub fn data_path(relative_path: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(relative_path);
    path.to_str().expect("data path").to_owned()
}

#[allow(dead_code)]
pub fn read_data(relative_path: &str) -> String {
    std::fs::read_to_string(data_path(relative_path))
        .unwrap_or_else(|e| panic!("failed to read {}: {}", relative_path, e))
}

#[allow(dead_code)]
pub fn alignment_dir() -> String {
    data_path("alignments")
}

// the test catalog with its file paths made absolute
#[allow(dead_code)]
pub fn get_test_catalog() -> Catalog {
    let mut catalog = Catalog::read(&data_path("receptors.json")).unwrap();

    for receptor in catalog.receptors.iter_mut() {
        receptor.alignment = data_path(&receptor.alignment).into();
        receptor.conservation_file = data_path(&receptor.conservation_file).into();
    }

    catalog
}
