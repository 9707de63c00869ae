//! Tests for stage detection and sensor group mapping.
mod common;
use ahash::AHashMap;
use common::*;
use cureflow::ops::aggregate::aggregate_groups;
use cureflow::prelude::*;

#[test]
fn test_ramp_scenario() {
    // Strictly increasing ramp: heating claims the warm tail, soaking and
    // cooling never fire, the cold head stays unassigned.
    let detector = StageDetector::new();
    let assignment = detector.detect(&ramp_table(), None, &curing_stages()).unwrap();

    assert_eq!(assignment.stage_data["heating"], vec![3, 4]);
    assert_eq!(assignment.stage_data["soaking"], Vec::<usize>::new());
    assert_eq!(assignment.stage_data["cooling"], Vec::<usize>::new());
    assert_eq!(
        assignment.labels,
        vec![
            None,
            None,
            None,
            Some("heating".to_string()),
            Some("heating".to_string()),
        ]
    );
}

#[test]
fn test_first_match_wins_on_overlap() {
    let stages = vec![
        StageDefinition {
            id: "first".to_string(),
            name: "First".to_string(),
            expression: "temp > 30".to_string(),
            priority: None,
        },
        StageDefinition {
            id: "second".to_string(),
            name: "Second".to_string(),
            expression: "temp > 20".to_string(),
            priority: None,
        },
    ];

    let detector = StageDetector::new();
    let assignment = detector.detect(&ramp_table(), None, &stages).unwrap();

    // Indices satisfying both conditions belong to the earlier stage;
    // no index appears under more than one stage.
    assert_eq!(assignment.stage_data["first"], vec![1, 2, 3, 4]);
    assert_eq!(assignment.stage_data["second"], vec![0]);
    for (i, label) in assignment.labels.iter().enumerate() {
        let memberships = assignment
            .stage_data
            .values()
            .filter(|indices| indices.contains(&i))
            .count();
        assert_eq!(memberships, 1, "index {} with label {:?}", i, label);
    }
}

#[test]
fn test_short_history_rate_is_defined() {
    // At index 0 the prefix series has a single sample; rate() must be 0
    // there, not a detection failure.
    let stages = vec![StageDefinition {
        id: "flat".to_string(),
        name: "Flat".to_string(),
        expression: "rate(series) == 0".to_string(),
        priority: None,
    }];

    let detector = StageDetector::new();
    let assignment = detector.detect(&ramp_table(), None, &stages).unwrap();
    assert_eq!(assignment.stage_data["flat"], vec![0]);
}

#[test]
fn test_priority_orders_detection() {
    let mut stages = curing_stages();
    // Declared last but prioritized first: an always-true stage takes
    // every index.
    stages.push(StageDefinition {
        id: "override".to_string(),
        name: "Override".to_string(),
        expression: "temp > 0".to_string(),
        priority: Some(0),
    });
    let rules = RuleSet {
        stages,
        ..RuleSet::default()
    };

    let ordered = rules.stages_in_order();
    assert_eq!(ordered[0].id, "override");

    let detector = StageDetector::new();
    let assignment = detector.detect(&ramp_table(), None, &ordered).unwrap();
    assert_eq!(assignment.stage_data["override"], vec![0, 1, 2, 3, 4]);
    assert_eq!(assignment.stage_data["heating"], Vec::<usize>::new());
}

#[test]
fn test_detection_failure_is_reported_not_partial() {
    let stages = vec![StageDefinition {
        id: "broken".to_string(),
        name: "Broken".to_string(),
        expression: "undefined_sensor > 1".to_string(),
        priority: None,
    }];

    let detector = StageDetector::new();
    let err = detector.detect(&ramp_table(), None, &stages).unwrap_err();
    assert_eq!(
        err,
        EvalError::UnknownSymbol("undefined_sensor".to_string())
    );
}

#[test]
fn test_group_mapping_scenario() {
    let definitions = vec![GroupDefinition {
        name: "thermocouples".to_string(),
        columns: vec!["PTC10".to_string(), "PTC11".to_string()],
        data_type: None,
    }];
    let table: SeriesTable =
        AHashMap::from([("PTC10".to_string(), vec![20.0, 21.0])]);

    let report = map_groups(&table, &definitions);
    assert_eq!(report.mappings["thermocouples"], vec!["PTC10".to_string()]);
    assert_eq!(report.selected, vec!["thermocouples".to_string()]);
    assert_eq!(report.total, 1);
}

#[test]
fn test_empty_group_is_reported_but_not_selected() {
    let report = map_groups(&ramp_table(), &thermocouple_groups());
    assert_eq!(report.mappings["thermocouples"], Vec::<String>::new());
    assert_eq!(report.mappings["pressure"], Vec::<String>::new());
    assert!(report.selected.is_empty());
    assert_eq!(report.total, 2);
}

#[test]
fn test_group_aggregation_means_members() {
    let report = map_groups(&recording_table(), &thermocouple_groups());
    let aggregated = aggregate_groups(&recording_table(), &report).unwrap();

    assert_eq!(
        aggregated["thermocouples"],
        vec![21.0, 31.0, 41.0, 51.0, 61.0]
    );
    assert_eq!(aggregated["pressure"], vec![1.0, 2.0, 6.0, 7.0, 2.0]);
}

#[test]
fn test_detector_operator_contract() {
    let detector = StageDetector::new();
    let mut inputs: OperatorInputs = AHashMap::new();
    inputs.insert("data".to_string(), DataValue::Table(ramp_table()));
    inputs.insert(
        "stages".to_string(),
        DataValue::StageDefs(curing_stages()),
    );

    let result = detector.run(&inputs);
    assert!(result.success);
    match &result.data.unwrap()["stages"] {
        DataValue::Stages(assignment) => {
            assert_eq!(assignment.stage_data["heating"], vec![3, 4]);
        }
        other => panic!("unexpected output {:?}", other),
    }
}
