//! Record store operation tests

use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::{database, logging, test_data};

#[test]
fn test_register_and_list_companies() {
    logging::init_test_logging();
    logging::log_test_step("Testing company registration");

    let test_db = database::init_fresh_test_database().expect("Failed to create test database");
    let db = &test_db.db;

    let acme = db
        .register_company("Acme Ltda", "12.345.678/0001-90", "contato@acme.com.br")
        .expect("Failed to register company");
    logging::log_test_data("Registered company", &acme);

    let companies = db.list_companies().expect("Failed to list companies");
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].id, acme);
    assert_eq!(companies[0].name, "Acme Ltda");

    let company = db.get_company(acme).expect("Failed to get company").expect("company should exist");
    assert_eq!(company.tax_id, "12.345.678/0001-90");
    assert_eq!(company.email, "contato@acme.com.br");
    assert!(company.created_at.is_some());
}

#[test]
fn test_company_ids_are_unique() {
    logging::init_test_logging();

    let test_db = database::init_fresh_test_database().expect("Failed to create test database");
    let names = ["Acme", "Beta", "Gama", "Delta", "Acme"];

    let mut ids: Vec<i64> = names
        .iter()
        .map(|name| test_data::register_test_company(&test_db.db, name))
        .collect();

    let listed: Vec<i64> = test_db.db.list_companies().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(listed, ids, "listing keeps insertion order");

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), names.len(), "every insert gets a fresh id");
}

#[test]
fn test_two_files_for_one_company() {
    logging::init_test_logging();
    logging::log_test_step("Testing file storage");

    let test_db = database::init_fresh_test_database().expect("Failed to create test database");
    let db = &test_db.db;
    let company = test_data::register_test_company(db, "Acme");
    let other = test_data::register_test_company(db, "Beta");

    let first = db.store_file(company, "balanco_2023.xlsx", b"first blob").unwrap();
    let second = db.store_file(company, "balanco_2024.xlsx", b"second blob").unwrap();
    let unrelated = db.store_file(other, "relatorio.pdf", b"%PDF-1.4 other").unwrap();
    assert_ne!(first, second);

    let file = db.get_file(first).unwrap().expect("first file");
    assert_eq!(file.company_id, company);
    assert_eq!(file.file_name, "balanco_2023.xlsx");
    assert_eq!(file.bytes, b"first blob".to_vec());

    let file = db.get_file(second).unwrap().expect("second file");
    assert_eq!(file.company_id, company);
    assert_eq!(file.bytes, b"second blob".to_vec());

    let listed = db.list_files(company).unwrap();
    assert_eq!(listed.iter().map(|f| f.id).collect::<Vec<_>>(), vec![first, second]);
    assert_eq!(listed[0].size_bytes, 10);

    let latest = db.latest_file(company).unwrap().expect("latest file");
    assert_eq!(latest.id, second);

    assert_eq!(db.list_files(other).unwrap().len(), 1);
    assert_eq!(db.get_file(unrelated).unwrap().unwrap().company_id, other);
}

#[test]
fn test_identical_uploads_are_not_deduplicated() {
    let test_db = database::init_fresh_test_database().expect("Failed to create test database");
    let company = test_data::register_test_company(&test_db.db, "Acme");

    let a = test_db.db.store_file(company, "balanco.xlsx", b"same").unwrap();
    let b = test_db.db.store_file(company, "balanco.xlsx", b"same").unwrap();

    assert_ne!(a, b);
    assert_eq!(test_db.db.get_stats().unwrap().files, 2);
}

#[test]
fn test_store_file_for_unknown_company_fails() {
    let test_db = database::init_fresh_test_database().expect("Failed to create test database");

    let result = test_db.db.store_file(999, "balanco.xlsx", b"blob");
    assert!(result.is_err());
    assert_eq!(test_db.db.get_stats().unwrap().files, 0);
}

#[test]
fn test_database_statistics() {
    let test_db = database::init_fresh_test_database().expect("Failed to create test database");
    let db = &test_db.db;

    let stats = db.get_stats().unwrap();
    assert_eq!((stats.companies, stats.files, stats.total_bytes), (0, 0, 0));

    let company = test_data::register_test_company(db, "Acme");
    db.store_file(company, "a.xlsx", &[0u8; 128]).unwrap();
    db.store_file(company, "b.pdf", &[0u8; 72]).unwrap();

    let stats = db.get_stats().unwrap();
    assert_eq!(stats.companies, 1);
    assert_eq!(stats.files, 2);
    assert_eq!(stats.total_bytes, 200);
}
