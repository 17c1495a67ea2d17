use surveyqc::process::schema::{DIFFERENCE, MEAN_RATING, REQUIRED_COLUMNS, UNIQUE_ID};
use surveyqc::sheets::{MemorySheet, Operation, SheetSource};
use surveyqc::{publish, transform, Destination, SheetsError, TransformError};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn source_rows(n: usize) -> Vec<Vec<String>> {
    let mut header = vec!["Timestamp".to_string()];
    header.extend(REQUIRED_COLUMNS.iter().map(|s| s.to_string()));
    let mut rows = vec![header];
    for i in 0..n {
        let overall = (i % 5 + 1).to_string();
        rows.push(row(&[
            &format!("2024-01-{:02}", i % 28 + 1),
            &format!("user{i}@example.com"),
            "Tool",
            "Feature",
            "4",
            "3",
            "5",
            "4",
            &overall,
            &format!("ID{i}"),
        ]));
    }
    rows
}

#[tokio::test]
async fn fetch_transform_publish_round_trip() {
    let source = MemorySheet::with_rows(&source_rows(25));
    let raw = source.get_values("'POD 5'!A1:CE1000").await.unwrap();
    let table = transform(raw).unwrap();
    assert_eq!(table.num_rows(), 25);

    // row order is the join key back to the source
    for i in 0..25 {
        assert_eq!(table.text_value(UNIQUE_ID, i), Some(format!("ID{i}").as_str()));
        assert_eq!(table.float_value(MEAN_RATING, i), Some(4.0));
        let overall = (i % 5 + 1) as f64;
        assert_eq!(table.float_value(DIFFERENCE, i), Some(4.0 - overall));
        let expected = if (4.0 - overall).abs() <= 1.0 { "Ok" } else { "Not ok" };
        assert_eq!(table.result(i), Some(expected));
    }

    let target = MemorySheet::new();
    let summary = publish(&target, &Destination::default(), table.clone())
        .await
        .unwrap();
    assert_eq!(summary.rows_written, 25);
    assert_eq!(target.snapshot(), table.to_rows());
    assert_eq!(target.rules().len(), 2);

    // second run with fewer rows leaves nothing behind
    let smaller = transform(source_rows(3).into()).unwrap();
    publish(&target, &Destination::default(), smaller.clone())
        .await
        .unwrap();
    assert_eq!(target.snapshot(), smaller.to_rows());
    assert_eq!(target.rules().len(), 2);
    assert_eq!(
        target.calls(),
        vec![
            Operation::Clear,
            Operation::Update,
            Operation::Format,
            Operation::Clear,
            Operation::Update,
            Operation::Format
        ]
    );
}

#[tokio::test]
async fn empty_source_is_nothing_to_do() {
    let source = MemorySheet::new();
    let raw = source.get_values("Sheet1!A1:CE1000").await.unwrap();
    assert!(raw.is_empty());
    let err = transform(raw).unwrap_err();
    assert!(err.is_empty_input());
}

#[tokio::test]
async fn schema_violation_stops_before_publish() {
    let source = MemorySheet::with_rows(&[
        row(&["Email Address", "Autonomy", "Unique ID"]),
        row(&["a@x.io", "3", "ID1"]),
    ]);
    let raw = source.get_values("Sheet1!A1:CE1000").await.unwrap();
    match transform(raw).unwrap_err() {
        TransformError::MissingColumns { missing } => {
            assert_eq!(missing.len(), 6);
            assert!(!missing.iter().any(|m| m == "Autonomy"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_failures_are_typed() {
    let source = MemorySheet::new();
    source.fail_on(Operation::GetValues);
    let err = source.get_values("Sheet1!A1:B2").await.unwrap_err();
    assert!(matches!(err, SheetsError::Api { status: 500, .. }));
}
