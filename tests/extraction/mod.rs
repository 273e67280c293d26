use orrery::model::ModelError;
use orrery::series::{self, ExtractionError};
use orrery::time::Unit;
use orrery::{AutomationModel, Capability, SessionError};

use crate::{propagated_session, t0};

#[test]
fn day_at_minute_step_yields_1441_rows() {
    let (mut session, satellite, _) = propagated_session();
    let table = session
        .fetch_series(
            &satellite,
            "Cartesian Velocity",
            "J2000",
            &["Time", "x", "y", "z"],
            Unit::Minute * 1,
        )
        .unwrap();

    let (start, stop) = session.scenario_window().unwrap();
    let expected = ((stop - start).to_seconds() / 60.0).floor() as usize + 1;
    assert_eq!(expected, 1441);
    assert_eq!(table.len(), expected);
    assert_eq!(table.names(), vec!["Time", "x", "y", "z"]);
    for column in table.columns() {
        assert_eq!(column.data().len(), expected);
    }
    assert_eq!(table.epochs("Time").unwrap()[0], t0());
}

#[test]
fn unknown_element_reports_first_bad_name() {
    let (mut session, satellite, _) = propagated_session();
    let err = session
        .fetch_series(
            &satellite,
            "Cartesian Velocity",
            "J2000",
            &["Time", "vorticity", "spin", "z"],
            Unit::Minute * 1,
        )
        .unwrap_err();
    match err {
        SessionError::Extraction {
            provider,
            source: ExtractionError::UnknownElement { element, .. },
        } => {
            assert_eq!(provider, "Cartesian Velocity//J2000");
            assert_eq!(element, "vorticity");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn bad_windows_are_refused_before_the_engine_runs() {
    let (mut session, satellite, _) = propagated_session();
    // Zero step is the one precondition reachable through the façade.
    let err = session
        .fetch_series(
            &satellite,
            "Cartesian Velocity",
            "J2000",
            &["Time", "x"],
            Unit::Second * 0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Extraction {
            source: ExtractionError::StepNotPositive { .. },
            ..
        }
    ));

    let err = session
        .fetch_series(
            &satellite,
            "Cartesian Velocity",
            "J2000",
            &[],
            Unit::Minute * 1,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Extraction {
            source: ExtractionError::NoElements,
            ..
        }
    ));
}

#[test]
fn inverted_window_is_refused_before_the_engine_runs() {
    use orrery::io::WindowCfg;
    use orrery::units::{self, UnitPreferences};
    use orrery::EntityKind;

    // Boundary-level setup to hand the extractor an inverted window, which
    // the façade itself can never produce.
    let mut model = orrery::sim::SimModel::new();
    model
        .connect(
            &WindowCfg::default(),
            units::shared(UnitPreferences::default()),
        )
        .unwrap();
    let scenario = model.new_scenario("Inverted").unwrap();
    let sat = model
        .new_child(&scenario, EntityKind::Satellite, "sat")
        .unwrap();
    let group = model.data_provider(&sat, "Cartesian Velocity").unwrap();
    let group = model.narrow(&group, Capability::ProviderGroup).unwrap();
    let provider = model.provider_item(&group, "J2000").unwrap();
    let provider = model.narrow(&provider, Capability::ProviderTimeVar).unwrap();

    let names = vec!["Time".to_string(), "x".to_string()];
    let err = series::extract(
        &mut model,
        &provider,
        t0() + Unit::Day * 1,
        t0(),
        Unit::Minute * 1,
        &names,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractionError::WindowOrder { .. }));
}

#[test]
fn unpropagated_satellite_cannot_be_sampled() {
    let (mut session, _, _) = propagated_session();
    let idle = session.add_satellite("Idle").unwrap();
    let err = session
        .fetch_series(
            &idle,
            "Cartesian Velocity",
            "J2000",
            &["Time", "x", "y", "z"],
            Unit::Minute * 1,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Extraction {
            source: ExtractionError::Query {
                source: ModelError::NoPropagator { .. }
            },
            ..
        }
    ));
}

#[test]
fn facility_position_is_a_fixed_provider() {
    let (mut session, _, facility) = propagated_session();
    let table = session
        .fetch_fixed(&facility, "Cartesian Position", &["x", "y", "z"])
        .unwrap();
    assert_eq!(table.len(), 1);
    // A fixed provider has no time-varying face to narrow to.
    let err = session
        .fetch_series(
            &facility,
            "Cartesian Position",
            "J2000",
            &["Time", "x"],
            Unit::Minute * 1,
        )
        .unwrap_err();
    assert!(matches!(err, SessionError::Narrowing { .. }));
}
