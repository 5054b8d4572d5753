//! Identifier parsing and offset tests

use observing_types::{
    DataId, DayObs, IdParseError, Instrument, ObsId, PixelPosition, VisitId, calculate_xy_offsets,
    parse_obs_id, parse_visit_id,
};

#[test]
fn obs_id_decodes_to_data_id() {
    let data_id = parse_obs_id("AT_O_20200219_000212").unwrap();
    assert_eq!(
        data_id,
        DataId {
            day_obs: DayObs::new(20_200_219).unwrap(),
            seq_num: 212,
            detector: 0,
            instrument: Instrument::Latiss,
        }
    );
}

#[test]
fn visit_id_decodes_to_data_id() {
    let data_id = parse_visit_id("2021032300308").unwrap();
    assert_eq!(data_id.day_obs.value(), 20_210_323);
    assert_eq!(data_id.seq_num, 308);
    assert_eq!(data_id.detector, 0);
    assert_eq!(data_id.instrument, Instrument::Latiss);
}

#[test]
fn obs_id_and_visit_id_of_same_exposure_agree() {
    let from_obs = parse_obs_id("AT_O_20210323_000308").unwrap();
    let from_visit = parse_visit_id(2_021_032_300_308_u64).unwrap();
    assert_eq!(from_obs, from_visit);
}

#[test]
fn data_id_round_trips_through_obs_id() {
    let data_id = parse_visit_id("2021032300308").unwrap();
    let obs_id: ObsId = data_id.obs_id().to_string().parse().unwrap();
    assert_eq!(obs_id.to_data_id(), data_id);
    assert_eq!(obs_id.source(), "AT");
}

#[test]
fn visit_id_accessors() {
    let visit: VisitId = "2020021900212".parse().unwrap();
    assert_eq!(visit.day_obs().to_string(), "20200219");
    assert_eq!(visit.seq_num(), 212);
}

#[test]
fn malformed_ids_are_typed_errors() {
    assert!(matches!(
        parse_obs_id("AT-O-20200219-000212"),
        Err(IdParseError::FieldCount { found: 1, .. })
    ));
    assert!(matches!(
        parse_obs_id("AT_O_2020AB19_000212"),
        Err(IdParseError::DayObs { .. })
    ));
    assert!(matches!(
        parse_obs_id("AT_O_20200219_00x212"),
        Err(IdParseError::SeqNum { .. })
    ));
    assert!(matches!(
        parse_visit_id("12345"),
        Err(IdParseError::VisitId { .. })
    ));
}

#[test]
fn offsets_use_instrument_plate_scale() {
    let offset = calculate_xy_offsets(
        PixelPosition::new(100.0, 50.0),
        PixelPosition::new(80.0, 60.0),
        Instrument::Latiss.pixel_scale(),
    );
    assert!((offset.dx - 2.0).abs() < 1e-9);
    assert!((offset.dy + 1.0).abs() < 1e-9);
}
