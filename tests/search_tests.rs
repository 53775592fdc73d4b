mod common;

use common::{CannedGeocoder, bangalore_points};
use haulmap::{
    geocode::{SearchControl, SearchHit},
    shared::Coordinate,
};

#[test]
fn labels_match_in_any_order() {
    let search = SearchControl::new(bangalore_points());
    let hits: Vec<_> = search
        .matching_points("3dx jcb")
        .into_iter()
        .map(|point| point.id.to_string())
        .collect();
    assert_eq!(hits.first().map(String::as_str), Some("1"));
}

#[test]
fn typo_still_matches() {
    let search = SearchControl::new(bangalore_points());
    let hits = search.matching_points("excavaton");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_ref(), "3");
}

#[test]
fn unrelated_query_matches_nothing() {
    let search = SearchControl::new(bangalore_points());
    assert!(search.matching_points("bulldozer").is_empty());
}

#[tokio::test]
async fn point_match_skips_geocoder() {
    let search = SearchControl::new(bangalore_points());
    let geocoder = CannedGeocoder::answering("Somewhere", Coordinate::new(0.0, 0.0));

    let hit = search.resolve("excavation", &geocoder).await;
    assert_eq!(
        hit,
        Some(SearchHit::Point {
            id: "3".into(),
            position: Coordinate::new(12.9680, 77.5920),
        })
    );
    assert!(geocoder.forward_queries.borrow().is_empty());
}

#[tokio::test]
async fn falls_back_to_geocoder() {
    let search = SearchControl::new(bangalore_points());
    let place = Coordinate::new(12.9352, 77.6245);
    let geocoder = CannedGeocoder::answering("Koramangala", place);

    let hit = search.resolve("  Koramangala  ", &geocoder).await;
    assert_eq!(hit, Some(SearchHit::Place { position: place }));
    assert_eq!(*geocoder.forward_queries.borrow(), ["Koramangala"]);
}

#[tokio::test]
async fn nothing_found_anywhere() {
    let search = SearchControl::new(bangalore_points());
    let geocoder = CannedGeocoder::offline();
    assert_eq!(search.resolve("Koramangala", &geocoder).await, None);
}

#[tokio::test]
async fn empty_query_is_ignored() {
    let search = SearchControl::new(bangalore_points());
    let geocoder = CannedGeocoder::offline();
    assert_eq!(search.resolve("   ", &geocoder).await, None);
    assert!(geocoder.forward_queries.borrow().is_empty());
}
