use zerf_tools::ToolError;
use zerf_tools::model::{
    COMMODITY_TYPE, CellValue, Dataset, ERF_NUMBER, ITEM, PURCHASING_GROUP, Record,
    SCHED_LINE_STATUS, SHIP_TO_PLANT, UNIQUE_ID,
};
use zerf_tools::pipeline::{self, Step};
use zerf_tools::rules::RuleConfiguration;

const DESCRIPTION: &str = "Description";

fn columns() -> Vec<String> {
    [
        ERF_NUMBER,
        ITEM,
        SCHED_LINE_STATUS,
        COMMODITY_TYPE,
        SHIP_TO_PLANT,
        PURCHASING_GROUP,
        DESCRIPTION,
    ]
    .iter()
    .map(|column| column.to_string())
    .collect()
}

/// A line that survives every default rule.
fn line(erf: &str, item: &str) -> Record {
    Record::new()
        .with(ERF_NUMBER, erf)
        .with(ITEM, item)
        .with(SCHED_LINE_STATUS, "Released")
        .with(COMMODITY_TYPE, "Direct")
        .with(SHIP_TO_PLANT, 6100.0)
        .with(PURCHASING_GROUP, "A01")
        .with(DESCRIPTION, format!("line {erf}/{item}"))
}

fn dataset(records: Vec<Record>) -> Dataset {
    Dataset::from_records(columns(), records)
}

fn mixed_dataset() -> Dataset {
    dataset(vec![
        line("100", "10"),
        line("100", "10").with(DESCRIPTION, "repeated export"),
        line("100", "20").with(SCHED_LINE_STATUS, "Draft"),
        line("101", "10").with(SCHED_LINE_STATUS, " submit "),
        line("102", "10").with(SCHED_LINE_STATUS, "   "),
        line("103", "10").with(COMMODITY_TYPE, "INDIRECT"),
        line("104", "10").with(SHIP_TO_PLANT, "6400"),
        line("105", "10").with(PURCHASING_GROUP, "z05"),
        line("106", "10").with(SHIP_TO_PLANT, "06200"),
        line("107", "10").with(SCHED_LINE_STATUS, CellValue::Empty),
    ])
}

#[test]
fn every_removed_row_is_attributed_to_one_step() {
    let input = mixed_dataset();
    let initial = input.len();

    let (output, report) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    assert_eq!(report.total_removed() + output.len(), initial);
    assert_eq!(report.initial_count(), initial);
    assert_eq!(report.final_count(), output.len());
    assert_eq!(output.len(), 2);
    assert_eq!(report.removed_by(Step::KeyDerivation), 0);
    assert_eq!(report.removed_by(Step::DuplicateRemoval), 1);
    assert_eq!(report.removed_by(Step::StatusExclusion), 2);
    assert_eq!(report.removed_by(Step::BlankStatusExclusion), 2);
    assert_eq!(report.removed_by(Step::CommodityExclusion), 1);
    assert_eq!(report.removed_by(Step::PlantInclusion), 1);
    assert_eq!(report.removed_by(Step::PurchasingGroupExclusion), 1);

    for outcome in report.steps() {
        assert_eq!(
            outcome.input_count - outcome.output_count,
            outcome.removed_count
        );
    }
}

#[test]
fn report_lists_seven_steps_in_order() {
    let (_, report) =
        pipeline::clean(mixed_dataset(), &RuleConfiguration::default()).expect("cleaned");
    let steps: Vec<Step> = report.steps().iter().map(|outcome| outcome.step).collect();
    assert_eq!(steps, Step::ALL.to_vec());

    let positions: Vec<usize> = steps.iter().map(|step| step.position()).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn cleaned_output_is_a_fixed_point() {
    let rules = RuleConfiguration::default();
    let (once, _) = pipeline::clean(mixed_dataset(), &rules).expect("first run");
    let (twice, report) = pipeline::clean(once.clone(), &rules).expect("second run");

    assert_eq!(report.total_removed(), 0);
    assert!(report.steps().iter().all(|outcome| outcome.removed_count == 0));
    assert_eq!(once, twice);
}

#[test]
fn preview_matches_committed_run() {
    let rules = RuleConfiguration::default();
    let input = mixed_dataset();

    let preview = pipeline::preview(&input, &rules, 3).expect("previewed");
    let (_, report) = pipeline::clean(input.clone(), &rules).expect("cleaned");

    assert_eq!(preview.report, report);
    assert_eq!(
        serde_json::to_string(&preview.report).expect("preview serialised"),
        serde_json::to_string(&report).expect("report serialised")
    );
    assert_eq!(input, mixed_dataset(), "preview leaves its input untouched");
}

#[test]
fn preview_samples_removed_rows_per_step() {
    let preview =
        pipeline::preview(&mixed_dataset(), &RuleConfiguration::default(), 1).expect("previewed");

    let status = preview
        .samples
        .iter()
        .find(|sample| sample.step == Step::StatusExclusion)
        .expect("status sample");
    assert_eq!(status.records.len(), 1);
    assert_eq!(status.records[0].text(ERF_NUMBER), "100");

    let duplicate = preview
        .samples
        .iter()
        .find(|sample| sample.step == Step::DuplicateRemoval)
        .expect("duplicate sample");
    assert_eq!(duplicate.records[0].text(DESCRIPTION), "repeated export");

    assert!(
        preview
            .samples
            .iter()
            .all(|sample| sample.step != Step::KeyDerivation)
    );
}

#[test]
fn disabling_all_steps_passes_input_through() {
    let input = mixed_dataset();
    let (output, report) =
        pipeline::clean(input.clone(), &RuleConfiguration::disabled()).expect("cleaned");

    assert_eq!(output, input);
    assert_eq!(report.steps().len(), 7);
    assert!(report.steps().iter().all(|outcome| outcome.removed_count == 0));
}

#[test]
fn duplicate_removal_keeps_first_record() {
    let input = dataset(vec![
        line("1", "A").with(DESCRIPTION, "first"),
        line("1", "A").with(DESCRIPTION, "second"),
    ]);

    let (output, report) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    assert_eq!(output.len(), 1);
    assert_eq!(output.records()[0].text(DESCRIPTION), "first");
    assert_eq!(output.records()[0].text(UNIQUE_ID), "1A");
    assert_eq!(report.removed_by(Step::DuplicateRemoval), 1);
}

#[test]
fn duplicate_removal_works_without_key_column() {
    let mut rules = RuleConfiguration::default();
    rules.key_derivation.enabled = false;
    let input = dataset(vec![line("1", "A"), line("1", "A"), line("1", "B")]);

    let (output, _) = pipeline::clean(input, &rules).expect("cleaned");

    assert_eq!(output.len(), 2);
    assert!(!output.has_column(UNIQUE_ID));
}

#[test]
fn key_column_follows_erf_number() {
    let (output, _) =
        pipeline::clean(dataset(vec![line("4500", "10")]), &RuleConfiguration::default())
            .expect("cleaned");

    assert_eq!(output.columns()[0], ERF_NUMBER);
    assert_eq!(output.columns()[1], UNIQUE_ID);
    assert_eq!(output.columns()[2], ITEM);
    assert_eq!(output.records()[0].text(UNIQUE_ID), "450010");
}

#[test]
fn plant_codes_are_compared_as_normalised_strings() {
    let input = dataset(vec![
        line("1", "10").with(SHIP_TO_PLANT, "06100"),
        line("2", "10").with(SHIP_TO_PLANT, 6400.0),
        line("3", "10").with(SHIP_TO_PLANT, " 6300 "),
        line("4", "10").with(SHIP_TO_PLANT, CellValue::Empty),
    ]);

    let (output, report) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    let kept: Vec<String> = output
        .records()
        .iter()
        .map(|record| record.text(ERF_NUMBER))
        .collect();
    assert_eq!(kept, vec!["1", "3"]);
    assert_eq!(report.removed_by(Step::PlantInclusion), 2);
}

#[test]
fn status_removals_are_split_between_named_and_blank() {
    let input = dataset(vec![
        line("1", "10").with(SCHED_LINE_STATUS, "draft"),
        line("2", "10").with(SCHED_LINE_STATUS, "DRAFT"),
        line("3", "10").with(SCHED_LINE_STATUS, ""),
        line("4", "10"),
    ]);

    let (output, report) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    assert_eq!(output.len(), 1);
    assert_eq!(report.removed_by(Step::StatusExclusion), 2);
    assert_eq!(report.removed_by(Step::BlankStatusExclusion), 1);
}

#[test]
fn commodity_exclusion_matches_whole_value() {
    let input = dataset(vec![
        line("1", "10").with(COMMODITY_TYPE, " indirect "),
        line("2", "10").with(COMMODITY_TYPE, "Indirect Material"),
    ]);

    let (output, report) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    assert_eq!(report.removed_by(Step::CommodityExclusion), 1);
    assert_eq!(output.records()[0].text(ERF_NUMBER), "2");
}

#[test]
fn missing_field_fails_before_any_step() {
    let columns: Vec<String> = columns()
        .into_iter()
        .filter(|column| column != PURCHASING_GROUP)
        .collect();
    let input = Dataset::from_records(columns, vec![line("1", "10")]);

    let error = pipeline::clean(input.clone(), &RuleConfiguration::default())
        .expect_err("schema error");
    match error {
        ToolError::Schema { field, step } => {
            assert_eq!(field, PURCHASING_GROUP);
            assert_eq!(step, Step::PurchasingGroupExclusion);
            assert_eq!(step.position(), 7);
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut rules = RuleConfiguration::default();
    rules.purchasing_group_exclusion.enabled = false;
    assert!(pipeline::clean(input, &rules).is_ok());
}

#[test]
fn check_schema_lists_every_missing_field() {
    let input = Dataset::new(vec![ERF_NUMBER.to_string(), SHIP_TO_PLANT.to_string()]);
    let missing = pipeline::check_schema(&input, &RuleConfiguration::default());

    let found: Vec<(&str, Step)> = missing
        .iter()
        .map(|entry| (entry.field.as_str(), entry.step))
        .collect();
    assert_eq!(
        found,
        vec![
            (ITEM, Step::KeyDerivation),
            (ITEM, Step::DuplicateRemoval),
            (SCHED_LINE_STATUS, Step::StatusExclusion),
            (SCHED_LINE_STATUS, Step::BlankStatusExclusion),
            (COMMODITY_TYPE, Step::CommodityExclusion),
            (PURCHASING_GROUP, Step::PurchasingGroupExclusion),
        ]
    );
}

#[test]
fn empty_dataset_completes_with_zero_report() {
    let (output, report) =
        pipeline::clean(dataset(Vec::new()), &RuleConfiguration::default()).expect("cleaned");

    assert!(output.is_empty());
    assert!(report.is_empty_input());
    assert_eq!(report.steps().len(), 7);
    assert!(report.steps().iter().all(|outcome| {
        outcome.input_count == 0 && outcome.output_count == 0 && outcome.removed_count == 0
    }));

    let (_, blank_sheet_report) =
        pipeline::clean(Dataset::default(), &RuleConfiguration::default()).expect("cleaned");
    assert_eq!(blank_sheet_report.total_removed(), 0);
}

#[test]
fn removing_every_row_is_flagged_on_the_report() {
    let input = dataset(vec![
        line("1", "10").with(SCHED_LINE_STATUS, "Draft"),
        line("2", "10").with(SHIP_TO_PLANT, "6400"),
    ]);

    let (output, report) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    assert!(output.is_empty());
    assert!(report.is_emptied());
    assert!(!report.is_empty_input());

    let (_, kept) =
        pipeline::clean(dataset(vec![line("3", "10")]), &RuleConfiguration::default())
            .expect("cleaned");
    assert!(!kept.is_emptied());
}

#[test]
fn key_column_in_other_case_is_overwritten_in_place() {
    let mut columns = columns();
    columns.push("unique_id".to_string());
    let input = Dataset::from_records(
        columns.clone(),
        vec![line("7", "10").with("unique_id", "stale")],
    );

    let (output, _) = pipeline::clean(input, &RuleConfiguration::default()).expect("cleaned");

    assert_eq!(output.columns(), columns.as_slice());
    assert!(!output.has_column(UNIQUE_ID));
    assert_eq!(output.records()[0].text("unique_id"), "710");
}

#[test]
fn malformed_rules_fail_before_schema_checks() {
    let mut rules = RuleConfiguration::default();
    rules.plant_inclusion.values.clear();

    let error = pipeline::clean(Dataset::default(), &rules).expect_err("configuration error");
    assert!(matches!(error, ToolError::Configuration(_)));
}

#[test]
fn custom_parameters_replace_defaults() {
    let rules = RuleConfiguration::from_toml_str(
        r#"
        [plant_inclusion]
        values = [6400]

        [purchasing_group_exclusion]
        values = ["A01"]
        "#,
    )
    .expect("rules parsed");
    let input = dataset(vec![
        line("1", "10").with(SHIP_TO_PLANT, "6400"),
        line("2", "10").with(SHIP_TO_PLANT, "6400").with(PURCHASING_GROUP, "W91"),
        line("3", "10"),
    ]);

    let (output, report) = pipeline::clean(input, &rules).expect("cleaned");

    assert_eq!(output.len(), 1);
    assert_eq!(output.records()[0].text(ERF_NUMBER), "2");
    assert_eq!(report.removed_by(Step::PlantInclusion), 1);
    assert_eq!(report.removed_by(Step::PurchasingGroupExclusion), 1);
}
