use std::fs;

use chrono::NaiveDate;
use consultas_records::statistics_from_str;
use serde_json::Value;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("No se pudo leer {path}: {err}"))
}

#[test]
fn statistics_match_golden() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).expect("fecha válida");

    let stats = statistics_from_str(
        &fixture("consultations.json"),
        &fixture("athletes.json"),
        &fixture("professionals.json"),
        today,
    )
    .expect("No se pudieron calcular las estadísticas");

    let actual = serde_json::to_value(&stats).expect("No se pudo serializar");
    let expected: Value =
        serde_json::from_str(&fixture("statistics_2024_03_15.json")).expect("Golden inválido");

    assert_eq!(actual, expected);
}

#[test]
fn monthly_buckets_run_oldest_to_newest() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).expect("fecha válida");
    let stats = statistics_from_str(
        &fixture("consultations.json"),
        &fixture("athletes.json"),
        &fixture("professionals.json"),
        today,
    )
    .expect("No se pudieron calcular las estadísticas");

    let labels: Vec<(u32, i32)> = stats
        .monthly_data_by_profesional
        .iter()
        .map(|bucket| (bucket.month_number, bucket.year))
        .collect();
    assert_eq!(labels.first(), Some(&(4, 2023)));
    assert_eq!(labels.last(), Some(&(3, 2024)));
    assert!(labels
        .windows(2)
        .all(|pair| (pair[0].1, pair[0].0) < (pair[1].1, pair[1].0)));
}
