// SPDX-License-Identifier: Apache-2.0

use pulse_model::{title_case_label, Family, PeriodKey, Quarter, StateName, Year};

#[test]
fn quarter_is_parsed_from_the_file_stem() {
    assert_eq!(Quarter::from_file_name("3.json").expect("q3").get(), 3);
    assert_eq!(Quarter::from_file_name("1.json").expect("q1").get(), 1);
}

#[test]
fn non_numeric_or_out_of_range_quarter_files_are_rejected() {
    assert!(Quarter::from_file_name("summary.json").is_err());
    assert!(Quarter::from_file_name("5.json").is_err());
    assert!(Quarter::from_file_name("0.json").is_err());
    assert!(Quarter::from_file_name(".json").is_err());
}

#[test]
fn state_names_follow_directory_convention() {
    assert!(StateName::parse("andaman-&-nicobar-islands").is_ok());
    assert!(StateName::parse("telangana").is_ok());
    assert!(StateName::parse("").is_err());
    assert!(StateName::parse("Tamil Nadu").is_err());
}

#[test]
fn year_must_have_four_digits() {
    assert_eq!(Year::parse("2022").expect("year").as_str(), "2022");
    assert!(Year::parse("22").is_err());
    assert!(Year::parse("20x2").is_err());
}

#[test]
fn display_labels_are_title_cased() {
    assert_eq!(title_case_label("andhra-pradesh"), "Andhra Pradesh");
    assert_eq!(
        StateName::parse("andaman-&-nicobar-islands")
            .expect("state")
            .display_name(),
        "Andaman & Nicobar Islands"
    );
    assert_eq!(title_case_label("RECHARGE"), "Recharge");
}

#[test]
fn period_key_renders_as_path_like_identity() {
    let key = PeriodKey::new(
        StateName::parse("telangana").expect("state"),
        Year::parse("2022").expect("year"),
        Quarter::new(3).expect("quarter"),
    );
    assert_eq!(key.to_string(), "telangana/2022/Q3");
}

#[test]
fn family_names_parse_with_either_separator() {
    assert_eq!(
        "map-user".parse::<Family>().expect("family"),
        Family::MapUser
    );
    assert_eq!(
        "top_insurance".parse::<Family>().expect("family"),
        Family::TopInsurance
    );
    let err = "bogus".parse::<Family>().expect_err("unknown family");
    assert!(err.0.contains("aggregated_transaction"));
}

#[test]
fn quarter_serializes_as_plain_number() {
    let q = Quarter::new(2).expect("quarter");
    assert_eq!(serde_json::to_string(&q).expect("json"), "2");
    let back: Quarter = serde_json::from_str("4").expect("parse");
    assert_eq!(back.get(), 4);
    assert!(serde_json::from_str::<Quarter>("9").is_err());
}
