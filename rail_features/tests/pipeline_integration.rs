//! End-to-end tests of the feature pipeline over CSV files.
//!
//! These tests ensure that:
//! 1. Journeys are rebuilt from paths and canceled stops are handled per setting
//! 2. Coordinates come from the reference tables when the snapshot lacks them
//! 3. The written feature table reads back and passes validation

use rail_features::config::{CanceledFilter, PipelineConfig, PipelineSettings};
use rail_features::io::{write_csv, write_json, ReferenceTables};
use rail_features::logging::RunLog;
use rail_features::parsing::csv_parser::{read_csv_as_text, text_column};
use rail_features::parsing::schema::output;
use rail_features::preprocessing::JourneyValidator;
use rail_features::transformations::filter_canceled;
use rail_features::{build_features, FeaturePipeline};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ==================== Helper Functions ====================

const RIDES: &str = "\
ID,path,eva_nr,station,city,zip,line,lat,long,arrival_plan,departure_plan,arrival_delay_m,departure_delay_m,info
100-2407160800-1,,8000207,Köln Hbf,Köln,50667,RE 5,,,,2024-07-16 08:00:00,NA,1,
100-2407160800-3,Köln Hbf|Köln Messe/Deutz|Bonn Hbf,8000044,Bonn Hbf,Bonn,53111,RE 5,50.732,7.097,2024-07-16 08:25:00,,4,,Störung. (Quelle: DB)
200-2407160900-1,,8000044,Bonn Hbf,Bonn,53111,RB 48,50.732,7.097,,2024-07-16 09:00:00,,0,
200-2407160900-2,,8000207,Köln Hbf,Köln,50667,RB 48,,,2024-07-16 09:20:00,,6,,
";

const STATIONS: &str = "Station Name,IBNR\nKöln Hbf,8000207\nKöln Messe/Deutz,8003368\nBonn Hbf,8000044\n";

const EUROPEAN: &str = "\
uic,name,latitude,longitude,country
8000207,Köln Hbf,50.943,6.958,DE
8003368,Köln Messe/Deutz,50.941,6.975,DE
8500010,Basel SBB,47.547,7.589,CH
";

struct Fixture {
    dir: TempDir,
    rides: PathBuf,
    tables: ReferenceTables,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, content: &str| -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    };
    let rides = write("rides.csv", RIDES);
    let stations = write("stations.csv", STATIONS);
    let european = write("european.csv", EUROPEAN);
    let tables =
        ReferenceTables::load(Some(stations.as_path()), Some(european.as_path()), None, "DE")
            .unwrap();
    Fixture { dir, rides, tables }
}

fn texts(path: &Path, column: &str) -> Vec<Option<String>> {
    let df = read_csv_as_text(path).unwrap();
    text_column(&df, column).unwrap().unwrap()
}

// ==================== Tests ====================

#[test]
fn test_build_features_and_read_back() {
    let fx = fixture();
    assert_eq!(fx.tables.european_stations.len(), 2);

    let mut result = build_features(&fx.rides, fx.tables.clone(), Default::default()).unwrap();
    let report = &result.report;
    assert_eq!(report.rows_in, 4);
    assert_eq!(report.expansion.journeys, 2);
    assert_eq!(report.expansion.canceled_journeys, 1);
    assert_eq!(report.canceled_removed, 1);
    assert_eq!(report.geo.still_missing, 0);
    assert_eq!(report.rows_out, 4);

    let out = fx.dir.path().join("out").join("features.csv");
    write_csv(&mut result.dataframe, &out).unwrap();

    let stations = texts(&out, output::STATION_NAME);
    assert_eq!(stations[1].as_deref(), Some("Köln Messe/Deutz"));
    let ids = texts(&out, output::STATION_ID);
    assert_eq!(ids[1].as_deref(), Some("8003368"));

    // Reconstructed stop 2 has no record and no delay
    let cumulative = texts(&out, output::CUMULATIVE_DELAY);
    assert_eq!(cumulative[1], None);
    assert_eq!(cumulative[2].as_deref().map(|v| v.parse::<f64>().unwrap()), Some(4.0));

    let encoded = texts(&out, output::INFO_LABEL_ENCODED);
    assert_eq!(encoded[2].as_deref(), Some("3"));

    let types = texts(&out, output::FINAL_TRAIN_TYPE);
    assert_eq!(types[0].as_deref(), Some("Regional Train"));

    let written = read_csv_as_text(&out).unwrap();
    let validation = JourneyValidator::validate_dataframe(&written);
    assert!(validation.is_valid, "{:?}", validation.errors);
    assert_eq!(validation.stats.journeys, 2);
    assert_eq!(validation.stats.missing_coordinates, 0);
}

#[test]
fn test_config_keeps_canceled_rows() {
    let fx = fixture();
    let config = PipelineConfig::from_toml_str(
        "[pipeline]\ncanceled_filter = \"keep\"\ndrop_columns = [\"zip\"]\n",
    )
    .unwrap();
    assert_eq!(config.pipeline.canceled_filter, CanceledFilter::Keep);

    let log = RunLog::new("keep");
    let mut result = FeaturePipeline::with_settings(config.pipeline)
        .process_file(&fx.rides, fx.tables, &log)
        .unwrap();
    assert_eq!(result.dataframe.height(), 5);
    assert!(result.dataframe.column(output::ZIP).is_err());

    let out = fx.dir.path().join("features.csv");
    write_csv(&mut result.dataframe, &out).unwrap();

    // Canceled flags survive the CSV round trip as text
    let written = read_csv_as_text(&out).unwrap();
    let kept = filter_canceled(&written).unwrap();
    assert_eq!(kept.height(), 4);

    let report = fx.dir.path().join("report.json");
    write_json(&result.report, &report).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["expansion"]["canceled_stops"], 1);
    assert_eq!(value["rows_out"], 5);
}

const PRE_EXPANDED: &str = "\
ID_Base,ID_Timestamp,ID_Stop_Number,station,city,line,lat,long,arrival_plan,departure_plan,arrival_delay_m,departure_delay_m
310,2407160800,1,Köln Hbf,Köln,RB 48,50.943,6.958,,2024-07-16 08:00:00,,0
310,2407160800,2,Köln Messe/Deutz,Köln,RB 48,50.941,6.975,2024-07-16 08:04:00,2024-07-16 08:05:00,1,1
310,2407160800,3,Bonn Hbf,Bonn,RB 48,50.732,7.097,2024-07-16 08:25:00,,3,
";

fn run_pre_expanded(dir: &Path, content: &str) -> rail_features::PipelineOutput {
    let rides = dir.join("pre_expanded.csv");
    fs::write(&rides, content).unwrap();
    let settings = PipelineSettings {
        expand_paths: false,
        ..PipelineSettings::default()
    };
    FeaturePipeline::with_settings(settings)
        .process_file(&rides, ReferenceTables::default(), &RunLog::new("pre-expanded"))
        .unwrap()
}

#[test]
fn test_pre_expanded_split_keys_without_path() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_pre_expanded(dir.path(), PRE_EXPANDED);

    assert_eq!(result.report.expansion.journeys, 1);
    assert_eq!(result.report.expansion.canceled_stops, 0);
    assert_eq!(result.report.canceled_removed, 0);
    assert_eq!(result.report.rows_out, 3);

    let stops: Vec<Option<u32>> = result
        .dataframe
        .column(output::STOP_INDEX)
        .unwrap()
        .u32()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(stops, vec![Some(1), Some(2), Some(3)]);
    assert!(result.report.validation.is_valid);
}

#[test]
fn test_pre_expanded_canceled_column_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines: Vec<String> = PRE_EXPANDED.lines().map(str::to_string).collect();
    lines[0].push_str(",canceled");
    for (line, flag) in lines[1..].iter_mut().zip(["False", "True", "False"]) {
        line.push(',');
        line.push_str(flag);
    }
    let content = lines.join("\n") + "\n";

    let result = run_pre_expanded(dir.path(), &content);
    assert_eq!(result.report.expansion.canceled_stops, 1);
    assert_eq!(result.report.canceled_removed, 1);
    assert_eq!(result.report.rows_out, 2);

    let stations = text_column(&result.dataframe, output::STATION_NAME)
        .unwrap()
        .unwrap();
    assert_eq!(
        stations,
        vec![Some("Köln Hbf".to_string()), Some("Bonn Hbf".to_string())]
    );
}

#[test]
fn test_missing_delay_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rides = dir.path().join("rides.csv");
    fs::write(
        &rides,
        "ID,path,arrival_plan,departure_plan,arrival_delay_m\n1-2407160800-1,,,,\n",
    )
    .unwrap();

    let err = build_features(&rides, ReferenceTables::default(), Default::default())
        .err()
        .unwrap();
    assert!(format!("{:#}", err).contains("departure_delay_m"));
}
