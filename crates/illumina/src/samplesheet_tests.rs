// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const MISEQ_SHEET: &str = "\
[Header],,,
IEMFileVersion,4,,
Experiment_Name,Exp20180101,,
Date,1/1/2018,,
[Reads],,,
151,,,
151,,,
[Settings],,,
ReverseComplement,0,,
[Data],,,
Sample_ID,Sample_Name,I7_Index_ID,index
1,S1,N701,TAAGGCGA
2,S2,N702,CGTACTAG
";

const V2_SHEET: &str = "\
[Header]
FileFormatVersion,2
RunName,Exp20250101
[Reads]
Read1Cycles,151
Read2Cycles,151
Index1Cycles,10
Index2Cycles,10
[BCLConvert_Settings]
SoftwareVersion,4.1.7
FastqCompressionFormat,gzip
[BCLConvert_Data]
Sample_ID,Index,Index2
SA1,TAAGGCGA,AACC
SA2,CGTACTAG,GGTT
";

#[test]
fn parses_header_fields() {
    let sheet = SampleSheet::parse(MISEQ_SHEET).unwrap();
    let header = sheet.fields("Header").unwrap();
    assert_eq!(header.get("Experiment_Name").map(String::as_str), Some("Exp20180101"));
    assert_eq!(header.get("IEMFileVersion").map(String::as_str), Some("4"));
}

#[test]
fn parses_reads_as_integers() {
    let sheet = SampleSheet::parse(MISEQ_SHEET).unwrap();
    assert_eq!(sheet.reads(), &[151, 151]);
    assert_eq!(sheet.read_count(), 2);
}

#[test]
fn parses_data_table() {
    let sheet = SampleSheet::parse(MISEQ_SHEET).unwrap();
    let data = sheet.data().unwrap();
    assert_eq!(data.columns, vec!["Sample_ID", "Sample_Name", "I7_Index_ID", "index"]);
    assert_eq!(data.rows.len(), 2);
    assert_eq!(data.rows[1].get("Sample_Name").map(String::as_str), Some("S2"));
}

#[test]
fn sample_names_prefer_sample_name_column() {
    let sheet = SampleSheet::parse(MISEQ_SHEET).unwrap();
    assert_eq!(sheet.sample_names(), vec!["S1", "S2"]);
}

#[test]
fn sample_names_fall_back_to_sample_id() {
    let sheet = SampleSheet::parse(V2_SHEET).unwrap();
    assert_eq!(sheet.sample_names(), vec!["SA1", "SA2"]);
}

#[test]
fn v2_reads_exclude_index_cycles() {
    let sheet = SampleSheet::parse(V2_SHEET).unwrap();
    assert_eq!(sheet.reads(), &[151, 151]);
}

#[test]
fn v2_settings_section() {
    let sheet = SampleSheet::parse(V2_SHEET).unwrap();
    let settings = sheet.fields("BCLConvert_Settings").unwrap();
    assert_eq!(settings.get("FastqCompressionFormat").map(String::as_str), Some("gzip"));
}

#[yare::parameterized(
    miseq = { MISEQ_SHEET, "Exp20180101" },
    v2    = { V2_SHEET,    "Exp20250101" },
)]
fn run_name_across_versions(text: &str, expected: &str) {
    let sheet = SampleSheet::parse(text).unwrap();
    assert_eq!(sheet.run_name(), Some(expected));
}

#[test]
fn run_name_accepts_spaced_key() {
    let sheet = SampleSheet::parse("[Header]\nExperiment Name,OldStyle\n").unwrap();
    assert_eq!(sheet.run_name(), Some("OldStyle"));
}

#[test]
fn unknown_sections_kept_raw() {
    let text = "[Header]\nExperiment_Name,E\n[Manifests]\nA,manifest.txt\n";
    let sheet = SampleSheet::parse(text).unwrap();
    assert!(matches!(sheet.section("Manifests"), Some(Section::Raw(rows)) if rows.len() == 1));
}

#[test]
fn data_before_section_is_an_error() {
    assert!(SampleSheet::parse("Experiment_Name,E\n").is_err());
}

#[test]
fn single_read_sheet_counts_one_file() {
    let text = "[Header]\nExperiment_Name,E\n[Reads]\n300\n[Data]\nSample_ID\n1\n";
    let sheet = SampleSheet::parse(text).unwrap();
    assert_eq!(sheet.read_count(), 1);
}
