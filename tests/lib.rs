mod extraction;
mod facade;
mod narrowing;
mod units;

use orrery::io::SessionCfg;
use orrery::session::{AscNode, ClassicalElements, Entity, GeodeticPosition, Location, SizeShape};
use orrery::sim::SimModel;
use orrery::time::{Epoch, Unit};
use orrery::{PropagatorKind, Session};

pub fn t0() -> Epoch {
    Epoch::from_gregorian_utc_hms(2016, 6, 10, 4, 0, 0)
}

/// The tutorial's LEO element set, entered as mean motion.
pub fn leo_elements() -> ClassicalElements {
    ClassicalElements::builder()
        .epoch(Epoch::from_gregorian_utc_hms(2016, 6, 8, 15, 14, 26))
        .size_shape(SizeShape::MeanMotion {
            revs_per_day: 15.083_858_40,
            ecc: 0.000_294_7,
        })
        .inc_deg(28.4703)
        .aop_deg(114.7239)
        .asc_node(AscNode::Raan { raan_deg: 315.1965 })
        .location(Location::MeanAnomaly { deg: 332.9096 })
        .build()
}

/// A connected session with a one-day scenario already active.
pub fn day_session() -> Session<SimModel> {
    let mut session = Session::connect(SimModel::new(), SessionCfg::default()).unwrap();
    session
        .new_scenario("S1", t0(), t0() + Unit::Day * 1)
        .unwrap();
    session
}

/// A session holding a propagated LEO satellite and a ground facility.
pub fn propagated_session() -> (Session<SimModel>, Entity, Entity) {
    let mut session = day_session();
    let facility = session
        .add_facility(
            "GroundPoint",
            GeodeticPosition {
                lat_deg: 38.9943,
                lon_deg: -76.8489,
                alt_km: 0.0,
            },
        )
        .unwrap();
    let satellite = session.add_satellite("LeoSat").unwrap();
    session
        .configure_propagator(&satellite, PropagatorKind::J2Perturbation, &leo_elements())
        .unwrap();
    (session, satellite, facility)
}
