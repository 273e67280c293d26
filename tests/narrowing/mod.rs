use orrery::io::WindowCfg;
use orrery::model::{CapabilityError, ModelError};
use orrery::sim::SimModel;
use orrery::units::{self, UnitPreferences};
use orrery::{AutomationModel, Capability, EntityKind, PropagatorKind};

/// A connected model with a scenario and one satellite, driven at the
/// boundary level to get at raw handles.
fn model_with_satellite() -> (SimModel, orrery::Handle) {
    let mut model = SimModel::new();
    model
        .connect(
            &WindowCfg::default(),
            units::shared(UnitPreferences::default()),
        )
        .unwrap();
    let scenario = model.new_scenario("Handles").unwrap();
    let sat = model
        .new_child(&scenario, EntityKind::Satellite, "sat")
        .unwrap();
    (model, sat)
}

#[test]
fn narrow_is_idempotent() {
    let (model, sat) = model_with_satellite();
    let once = model.narrow(&sat, Capability::Satellite).unwrap();
    let twice = model.narrow(&once, Capability::Satellite).unwrap();
    assert_eq!(once, twice);
    // And narrowing does not mutate: the generic handle still works.
    assert!(model.narrow(&sat, Capability::Generic).is_ok());
}

#[test]
fn narrowing_to_an_unconfigured_kind_fails() {
    let (mut model, sat) = model_with_satellite();
    let sat = model.narrow(&sat, Capability::Satellite).unwrap();
    model
        .set_propagator(&sat, PropagatorKind::J2Perturbation)
        .unwrap();
    let prop = model.propagator_of(&sat).unwrap();
    // The J2-configured propagator narrows to J2...
    assert!(model
        .narrow(&prop, Capability::Propagator(PropagatorKind::J2Perturbation))
        .is_ok());
    // ...but not to J4.
    let err = model
        .narrow(&prop, Capability::Propagator(PropagatorKind::J4Perturbation))
        .unwrap_err();
    assert!(matches!(
        err,
        CapabilityError::Unsupported {
            capability: Capability::Propagator(PropagatorKind::J4Perturbation),
            ..
        }
    ));
}

#[test]
fn switching_kind_stales_old_handles() {
    let (mut model, sat) = model_with_satellite();
    let sat = model.narrow(&sat, Capability::Satellite).unwrap();
    model
        .set_propagator(&sat, PropagatorKind::J2Perturbation)
        .unwrap();
    let old_generic = model.propagator_of(&sat).unwrap();
    let old_prop = model
        .narrow(
            &old_generic,
            Capability::Propagator(PropagatorKind::J2Perturbation),
        )
        .unwrap();
    let old_rep = model.convert_to_classical(&old_prop).unwrap();

    model
        .set_propagator(&sat, PropagatorKind::TwoBody)
        .unwrap();

    // Everything minted for the J2 configuration is now dead.
    assert!(model.narrow(&old_generic, Capability::Generic).is_err());
    assert!(matches!(
        model.set_epoch(&old_prop, "08 Jun 2016 15:14:26").unwrap_err(),
        ModelError::Capability { .. }
    ));
    assert!(matches!(
        model.convert_to_classical(&old_prop).unwrap_err(),
        ModelError::Capability { .. }
    ));
    let rep = model.narrow(&old_rep, Capability::ClassicalState);
    // The representation handle may still resolve, but using it must fail.
    if let Ok(rep) = rep {
        assert!(matches!(
            model
                .set_state_element(&rep, orrery::model::StateElement::Eccentricity, 0.01)
                .unwrap_err(),
            ModelError::Capability { .. }
        ));
    }

    // The fresh configuration narrows fine.
    let new_prop = model.propagator_of(&sat).unwrap();
    assert!(model
        .narrow(&new_prop, Capability::Propagator(PropagatorKind::TwoBody))
        .is_ok());
}

#[test]
fn wrong_entity_kind_does_not_narrow() {
    let mut model = SimModel::new();
    model
        .connect(
            &WindowCfg::default(),
            units::shared(UnitPreferences::default()),
        )
        .unwrap();
    let scenario = model.new_scenario("Kinds").unwrap();
    let fac = model
        .new_child(&scenario, EntityKind::Facility, "pad")
        .unwrap();
    assert!(model.narrow(&fac, Capability::Facility).is_ok());
    assert!(model.narrow(&fac, Capability::Satellite).is_err());
    assert!(model.narrow(&scenario, Capability::Scenario).is_ok());
    assert!(model.narrow(&scenario, Capability::Facility).is_err());
}
