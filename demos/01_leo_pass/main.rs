extern crate orrery;
extern crate pretty_env_logger as pel;

use orrery::io::{SessionCfg, WindowCfg};
use orrery::session::{AscNode, ClassicalElements, GeodeticPosition, Location, SizeShape};
use orrery::sim::SimModel;
use orrery::time::{Epoch, Unit};
use orrery::{PropagatorKind, Session};

use std::error::Error;

/// Walks the classic tutorial flow: one scenario, one ground facility, one
/// LEO satellite on a J2 propagator, then a day of Cartesian velocity at one
/// minute resolution.
fn main() -> Result<(), Box<dyn Error>> {
    pel::init();

    // The scripted backend stands in for the real application. Swapping in a
    // live backend only changes this one line.
    let cfg = SessionCfg::builder()
        .window(WindowCfg::builder().width(960).height(1050).build())
        .build();
    let mut session = Session::connect(SimModel::new(), cfg)?;

    // Scenario with a one-day analysis interval.
    let start = Epoch::from_gregorian_utc_hms(2016, 6, 10, 4, 0, 0);
    let stop = start + Unit::Day * 1;
    session.new_scenario("LeoPass", start, stop)?;

    // A ground station near Greenbelt, MD.
    let facility = session.add_facility(
        "GroundPoint",
        GeodeticPosition {
            lat_deg: 38.9943,
            lon_deg: -76.8489,
            alt_km: 0.0,
        },
    )?;

    // The satellite enters its orbit as mean motion + eccentricity, with the
    // remaining angles in degrees. The façade handles the unit switching.
    let satellite = session.add_satellite("LeoSat")?;
    let elements = ClassicalElements::builder()
        .epoch(Epoch::from_gregorian_utc_hms(2016, 6, 8, 15, 14, 26))
        .size_shape(SizeShape::MeanMotion {
            revs_per_day: 15.083_858_40,
            ecc: 0.000_294_7,
        })
        .inc_deg(28.4703)
        .aop_deg(114.7239)
        .asc_node(AscNode::Raan { raan_deg: 315.1965 })
        .location(Location::MeanAnomaly { deg: 332.9096 })
        .build();
    session.configure_propagator(&satellite, PropagatorKind::J2Perturbation, &elements)?;

    // Velocity in the inertial frame, one sample per minute.
    let velocity = session.fetch_series(
        &satellite,
        "Cartesian Velocity",
        "J2000",
        &["Time", "x", "y", "z"],
        Unit::Minute * 1,
    )?;
    println!("{velocity}");
    let times = velocity.epochs("Time").unwrap();
    let (x, y, z) = (
        velocity.reals("x").unwrap(),
        velocity.reals("y").unwrap(),
        velocity.reals("z").unwrap(),
    );
    for row in 0..5.min(velocity.len()) {
        println!(
            "{}\t{:+.6}\t{:+.6}\t{:+.6}",
            times[row], x[row], y[row], z[row]
        );
    }
    velocity.to_csv("./01_leo_pass_velocity.csv")?;

    // The facility position is a fixed provider: one sample, no window.
    let position = session.fetch_fixed(&facility, "Cartesian Position", &["x", "y", "z"])?;
    println!(
        "facility at [{:.3}, {:.3}, {:.3}] km",
        position.reals("x").unwrap()[0],
        position.reals("y").unwrap()[0],
        position.reals("z").unwrap()[0]
    );

    // Dropping the session would release the application too; being explicit
    // mirrors the tutorial's closing step.
    session.disconnect();
    Ok(())
}
