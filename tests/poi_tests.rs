use haulmap::poi::{self, PoiKind};

#[test]
fn load_from_csv_test() {
    let csv_path = format!("{}/tests/points.csv", env!("CARGO_MANIFEST_DIR"));
    let points = poi::load_csv(csv_path).unwrap();

    assert_eq!(points.len(), 5);
    for point in points.iter() {
        if point.id.is_empty() {
            panic!("id should never be empty");
        }
        if point.label.is_empty() {
            panic!("label should never be empty");
        }
        if !point.position.is_valid() {
            panic!("position of {} should be valid", point.id);
        }
    }

    let kinds: Vec<_> = points.iter().map(|point| point.kind).collect();
    assert_eq!(
        kinds,
        [
            PoiKind::Provider,
            PoiKind::Provider,
            PoiKind::Request,
            PoiKind::Provider,
            PoiKind::Request,
        ]
    );
}

#[test]
fn missing_file_is_io_error() {
    let err = poi::load_csv("/nonexistent/points.csv").unwrap_err();
    assert!(matches!(err, poi::Error::Io(_)));
}

#[test]
fn duplicate_ids_are_rejected() {
    let data = "id,latitude,longitude,label,kind\n\
                1,12.9716,77.5946,JCB 3DX Super,provider\n\
                1,12.9700,77.5950,JCB 3CX Eco,provider\n";
    let err = poi::parse_csv(data.as_bytes()).unwrap_err();
    assert!(matches!(err, poi::Error::DuplicateId(id) if id == "1"));
}

#[test]
fn unknown_kind_is_csv_error() {
    let data = "id,latitude,longitude,label,kind\n1,12.9716,77.5946,Crane,landlord\n";
    let err = poi::parse_csv(data.as_bytes()).unwrap_err();
    assert!(matches!(err, poi::Error::Csv(_)));
}
