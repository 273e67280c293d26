use approx::assert_relative_eq;
use orrery::io::SessionCfg;
use orrery::model::ModelError;
use orrery::session::{GeodeticPosition, SizeShape};
use orrery::sim::SimModel;
use orrery::time::Unit;
use orrery::{PropagatorKind, Session, SessionError};

use crate::{day_session, leo_elements, propagated_session, t0};

#[test]
fn end_to_end_leo_pass() {
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

    // Row count per the window/step formula, first stamp at scenario start.
    assert_eq!(table.len(), 1441);
    assert_eq!(table.epochs("Time").unwrap()[0], t0());

    // Under the default km/s preferences, the stand-in signal's magnitude is
    // the circular speed for the configured mean motion.
    let n_rad_s = 15.083_858_40 * std::f64::consts::TAU / 86_400.0;
    let sma_km = (398_600.435_436_f64 / (n_rad_s * n_rad_s)).cbrt();
    let (x, y, z) = (
        table.reals("x").unwrap(),
        table.reals("y").unwrap(),
        table.reals("z").unwrap(),
    );
    for row in [0, 720, 1440] {
        let speed = (x[row].powi(2) + y[row].powi(2) + z[row].powi(2)).sqrt();
        assert_relative_eq!(speed, n_rad_s * sma_km, max_relative = 1e-9);
    }
}

#[test]
fn scenario_collision_fails() {
    let mut session = day_session();
    let err = session
        .new_scenario("S2", t0(), t0() + Unit::Day * 1)
        .unwrap_err();
    assert!(matches!(err, SessionError::ScenarioActive { name } if name == "S1"));
}

#[test]
fn entity_name_collision_fails() {
    let mut session = day_session();
    session.add_satellite("Twin").unwrap();
    // Same name, other kind: fine.
    session
        .add_facility(
            "Twin",
            GeodeticPosition {
                lat_deg: 0.0,
                lon_deg: 0.0,
                alt_km: 0.0,
            },
        )
        .unwrap();
    let err = session.add_satellite("Twin").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Automation {
            source: ModelError::DuplicateName { .. },
            ..
        }
    ));
}

#[test]
fn operations_require_a_scenario() {
    let mut session = Session::connect(SimModel::new(), SessionCfg::default()).unwrap();
    assert!(matches!(
        session.add_satellite("sat").unwrap_err(),
        SessionError::NoScenario
    ));
    assert!(matches!(
        session.close_scenario().unwrap_err(),
        SessionError::NoScenario
    ));
}

#[test]
fn close_scenario_allows_a_fresh_one() {
    let mut session = day_session();
    session.close_scenario().unwrap();
    assert!(session.scenario_window().is_none());
    session
        .new_scenario("S2", t0(), t0() + Unit::Hour * 2)
        .unwrap();
    assert_eq!(
        session.scenario_window(),
        Some((t0(), t0() + Unit::Hour * 2))
    );
}

#[test]
fn disconnect_is_idempotent() {
    let mut session = day_session();
    assert!(session.is_connected());
    session.disconnect();
    assert!(!session.is_connected());
    session.disconnect();
    assert!(!session.is_connected());
}

#[test]
fn engine_rejects_unphysical_elements() {
    let mut session = day_session();
    let satellite = session.add_satellite("Brick").unwrap();
    let mut elements = leo_elements();
    elements.size_shape = SizeShape::MeanMotion {
        revs_per_day: 15.0,
        ecc: 1.5,
    };
    let err = session
        .configure_propagator(&satellite, PropagatorKind::J2Perturbation, &elements)
        .unwrap_err();
    match err {
        SessionError::Propagation { entity, msg } => {
            assert_eq!(entity, "Brick");
            assert!(msg.contains("eccentricity"), "unexpected message: {msg}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn reconfiguring_the_propagator_works_through_fresh_handles() {
    let (mut session, satellite, _) = propagated_session();
    // Switch from J2 to two-body: the façade re-narrows internally, so the
    // discarded configuration never leaks out.
    let mut elements = leo_elements();
    elements.size_shape = SizeShape::SemiMajorAxis {
        sma_km: 6_878.0,
        ecc: 0.001,
    };
    session
        .configure_propagator(&satellite, PropagatorKind::TwoBody, &elements)
        .unwrap();
    let table = session
        .fetch_series(
            &satellite,
            "Cartesian Velocity",
            "J2000",
            &["Time", "x", "y", "z"],
            Unit::Minute * 10,
        )
        .unwrap();
    assert_eq!(table.len(), 145);
}

#[test]
fn series_survive_the_session() {
    // The table is an owned value; dropping the session must not disturb it.
    let table = {
        let (mut session, satellite, _) = propagated_session();
        session
            .fetch_series(
                &satellite,
                "Cartesian Velocity",
                "Fixed",
                &["Time", "x"],
                Unit::Hour * 1,
            )
            .unwrap()
    };
    assert_eq!(table.len(), 25);
    assert_eq!(table.names(), vec!["Time", "x"]);
}
