mod common;

use camino::Utf8PathBuf;
use foodlex::BrowserConfig;
use foodlex::validate::{Severity, validate_dir};
use std::fs;
use tempfile::tempdir;

fn write_site(root: &Utf8PathBuf) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("spices.json"), common::spices().to_string()).unwrap();
    fs::write(data.join("fish-seafood.json"), common::fish().to_string()).unwrap();
    fs::write(data.join("grains-pulses.json"), common::grains().to_string()).unwrap();
    fs::write(data.join("vegetables-fruits.json"), common::vegetables().to_string()).unwrap();
    fs::write(data.join("flowers.json"), common::flowers().to_string()).unwrap();
}

#[test]
fn fixture_site_has_warnings_but_no_errors() {
    let tmp = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    write_site(&root);

    let report = validate_dir(&root, &BrowserConfig::default());
    assert!(report.passed(), "{:#?}", report);
    assert_eq!(report.categories.len(), 5);
    assert!(report.warnings > 0);
    assert!(report.unreferenced.is_empty());

    let spices = report
        .categories
        .iter()
        .find(|c| c.category == "spices")
        .unwrap();
    assert_eq!(spices.entities, 3);
    // chilli has no notes
    assert!(
        spices
            .issues
            .iter()
            .any(|i| i.item.as_deref() == Some("chilli") && i.message == "empty notes")
    );
    // turmeric carries the bengali placeholder, cumin and chilli lack the key
    assert_eq!(spices.missing_languages["bengali"], 3);
    assert_eq!(spices.missing_languages["tamil"], 0);
}

#[test]
fn broken_and_stray_documents_are_reported() {
    let tmp = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    write_site(&root);
    fs::write(root.join("data/fish-seafood.json"), "[{ \"id\": ").unwrap();
    fs::remove_file(root.join("data/flowers.json")).unwrap();
    fs::write(root.join("data/spices-old.json"), "[]").unwrap();

    let report = validate_dir(&root, &BrowserConfig::default());
    assert!(!report.passed());
    assert_eq!(report.errors, 2);

    let fish = report.categories.iter().find(|c| c.category == "fish").unwrap();
    assert_eq!(fish.issues[0].severity, Severity::Error);
    assert!(fish.issues[0].message.starts_with("invalid JSON"));

    assert_eq!(report.unreferenced.len(), 1);
    assert!(report.unreferenced[0].ends_with("spices-old.json"));
}
