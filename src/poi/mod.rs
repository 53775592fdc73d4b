mod source;
pub use source::*;

use std::{fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::shared::{Identifiable, geo::Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiKind {
    /// Operator with equipment available.
    #[serde(alias = "operator")]
    Provider,
    /// Open job looking for equipment.
    #[serde(alias = "job")]
    Request,
}

impl Display for PoiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoiKind::Provider => f.write_str("provider"),
            PoiKind::Request => f.write_str("request"),
        }
    }
}

impl PoiKind {
    pub const fn marker_color(&self) -> &'static str {
        match self {
            PoiKind::Provider => "#FF6500",
            PoiKind::Request => "#007CFF",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    pub id: Arc<str>,
    pub position: Coordinate,
    pub label: Arc<str>,
    pub kind: PoiKind,
    #[serde(skip)]
    normalized_label: Arc<str>,
}

impl PointOfInterest {
    pub fn new(
        id: impl Into<Arc<str>>,
        position: Coordinate,
        label: impl Into<Arc<str>>,
        kind: PoiKind,
    ) -> Self {
        let label: Arc<str> = label.into();
        Self {
            id: id.into(),
            position,
            normalized_label: label.to_lowercase().into(),
            label,
            kind,
        }
    }
}

impl Identifiable for PointOfInterest {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn normalized_name(&self) -> &str {
        &self.normalized_label
    }
}

#[test]
fn label_is_normalized_for_search() {
    let poi = PointOfInterest::new(
        "1",
        Coordinate::new(12.9716, 77.5946),
        "JCB 3DX Super",
        PoiKind::Provider,
    );
    assert_eq!(poi.normalized_name(), "jcb 3dx super");
    assert_eq!(poi.kind.marker_color(), "#FF6500");
}
