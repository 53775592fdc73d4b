use std::{fs, io, io::Read, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    poi::{PoiKind, PointOfInterest},
    shared::geo::Coordinate,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Point {0} has an invalid coordinate")]
    InvalidCoordinate(String),
    #[error("Point id {0} appears more than once")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
struct PoiRecord {
    id: String,
    latitude: f64,
    longitude: f64,
    label: String,
    kind: PoiKind,
}

impl TryFrom<PoiRecord> for PointOfInterest {
    type Error = self::Error;

    fn try_from(value: PoiRecord) -> Result<Self, Self::Error> {
        let position = Coordinate::new(value.latitude, value.longitude);
        if !position.is_valid() {
            return Err(self::Error::InvalidCoordinate(value.id));
        }
        Ok(PointOfInterest::new(value.id, position, value.label, value.kind))
    }
}

/// Reads points from a csv file with the header `id,latitude,longitude,label,kind`.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PointOfInterest>, self::Error> {
    let file = fs::File::open(path.as_ref())?;
    let points = parse_csv(file)?;
    debug!("Loaded {} points from {:?}", points.len(), path.as_ref());
    Ok(points)
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<PointOfInterest>, self::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut points: Vec<PointOfInterest> = Vec::new();
    for result in rdr.deserialize() {
        let record: PoiRecord = result?;
        if points.iter().any(|point| *point.id == record.id) {
            return Err(self::Error::DuplicateId(record.id));
        }
        points.push(record.try_into()?);
    }
    Ok(points)
}

#[test]
fn parse_points() {
    let data = "id,latitude,longitude,label,kind\n\
                1,12.9716,77.5946,JCB 3DX Super,provider\n\
                3,12.9680,77.5920,Excavation Project,job\n";
    let points = parse_csv(data.as_bytes()).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].kind, PoiKind::Request);
    assert_eq!(&*points[0].label, "JCB 3DX Super");
}

#[test]
fn reject_invalid_coordinate() {
    let data = "id,latitude,longitude,label,kind\n7,120.0,77.5946,Broken,provider\n";
    let err = parse_csv(data.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::InvalidCoordinate(id) if id == "7"));
}

#[test]
fn reject_duplicate_id() {
    let data = "id,latitude,longitude,label,kind\n\
                1,12.0,77.0,A,provider\n\
                1,12.1,77.1,B,request\n";
    assert!(matches!(parse_csv(data.as_bytes()), Err(Error::DuplicateId(_))));
}
