use orrery::units::{
    self, AngleUnit, DistanceUnit, TimeUnit, UnitOverride, UnitPreferences, UnitScope,
};
use rstest::rstest;

use crate::day_session;

#[rstest]
#[case::angle_only(&[UnitOverride::Angle(AngleUnit::Radians)])]
#[case::two_dims(&[
    UnitOverride::Time(TimeUnit::Days),
    UnitOverride::Distance(DistanceUnit::Meters),
])]
#[case::all_dims(&[
    UnitOverride::Angle(AngleUnit::Revolutions),
    UnitOverride::Time(TimeUnit::Hours),
    UnitOverride::Distance(DistanceUnit::Meters),
])]
fn scope_restores_exactly(#[case] overrides: &[UnitOverride]) {
    let table = units::shared(UnitPreferences::default());
    {
        let _scope = UnitScope::apply(&table, overrides);
    }
    assert_eq!(*table.borrow(), UnitPreferences::default());
}

#[test]
fn nested_scopes_unwind_in_order() {
    let table = units::shared(UnitPreferences::default());
    let outer = UnitScope::apply(&table, &[UnitOverride::Angle(AngleUnit::Revolutions)]);
    {
        let _inner = UnitScope::apply(
            &table,
            &[
                UnitOverride::Angle(AngleUnit::Radians),
                UnitOverride::Time(TimeUnit::Days),
            ],
        );
        assert_eq!(table.borrow().angle, AngleUnit::Radians);
        assert_eq!(table.borrow().time, TimeUnit::Days);
    }
    // The inner scope must hand back the outer override, not the default.
    assert_eq!(table.borrow().angle, AngleUnit::Revolutions);
    assert_eq!(table.borrow().time, TimeUnit::Seconds);
    drop(outer);
    assert_eq!(*table.borrow(), UnitPreferences::default());
}

#[test]
fn closure_form_restores_on_failure() {
    let table = units::shared(UnitPreferences::default());
    let out: Result<(), &str> = units::with_units(
        &table,
        &[UnitOverride::Distance(DistanceUnit::Meters)],
        || {
            units::with_units(&table, &[UnitOverride::Distance(DistanceUnit::Kilometers)], || {
                assert_eq!(table.borrow().distance, DistanceUnit::Kilometers);
                Err("inner failure")
            })
        },
    );
    assert!(out.is_err());
    assert_eq!(*table.borrow(), UnitPreferences::default());
}

#[test]
fn session_scopes_nest_through_the_facade() {
    let mut session = day_session();
    let table = session.units();
    let out: Result<(), orrery::SessionError> =
        session.with_units(&[UnitOverride::Time(TimeUnit::Days)], |s| {
            assert_eq!(s.units().borrow().time, TimeUnit::Days);
            s.with_units(&[UnitOverride::Time(TimeUnit::Minutes)], |s2| {
                assert_eq!(s2.units().borrow().time, TimeUnit::Minutes);
                Ok(())
            })
        });
    out.unwrap();
    assert_eq!(table.borrow().time, TimeUnit::Seconds);
}

#[test]
fn facade_operations_leave_no_unit_residue() {
    let table;
    {
        let (session, _, _) = crate::propagated_session();
        table = session.units();
        // Propagator configuration switched to revs/day and back internally.
        assert_eq!(*table.borrow(), UnitPreferences::default());
    }
    assert_eq!(*table.borrow(), UnitPreferences::default());
}
