/*
    Orrery, typed automation for astrodynamics applications
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! A scripted, in-process implementation of the automation boundary.
//!
//! [SimModel] mimics the *protocol* of a real engine: one object tree, one
//! capability set per object and configuration, a shared unit preference
//! table consulted on every dimensioned call, handle invalidation on
//! propagator changes, and engine-side validation on propagate. It does NOT
//! model orbital motion: element queries return a deterministic circular
//! stand-in signal so that consumers see smoothly varying, correctly sized,
//! correctly unit-scaled samples.

use crate::io::WindowCfg;
use crate::model::{
    timefmt, AscNodeKind, AutomationModel, Capability, CapabilityError, ColumnData,
    ConnectionError, EntityKind, Handle, LocationKind, ModelError, PropagatorKind, SizeShapeKind,
    StateElement, StateLayout,
};
use crate::model::{
    AlreadyConnectedSnafu, BadTimestampSnafu, CapabilitySnafu, DuplicateNameSnafu,
    LayoutMismatchSnafu, NoPropagatorSnafu, NoScenarioLoadedSnafu, NotConnectedSnafu,
    NotPropagatedSnafu, PropagationFailedSnafu, QueryRejectedSnafu, ScenarioLoadedSnafu,
    UnknownElementSnafu, UnknownProviderItemSnafu, UnknownProviderSnafu, UnsupportedSnafu,
};
use crate::time::{Epoch, TimeSeries, Unit};
use crate::units::{SharedUnits, UnitPreferences};
use nalgebra::Vector3;
use snafu::prelude::*;

/// Earth gravitational parameter used to size the stand-in signal.
const GM_EARTH_KM3_S2: f64 = 398_600.435_436;
/// Mean Earth radius used by the facility position stand-in.
const EARTH_RADIUS_KM: f64 = 6_378.136_3;

const TIMEVAR_ELEMENTS: [&str; 4] = ["Time", "x", "y", "z"];
const FIXED_ELEMENTS: [&str; 3] = ["x", "y", "z"];

/// Canonical storage of a classical state, in radians, rad/s and km.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct ClassicalRecord {
    mean_motion_rad_s: f64,
    sma_km: f64,
    ecc: f64,
    inc_rad: f64,
    aop_rad: f64,
    node_rad: f64,
    anomaly_rad: f64,
}

/// Parameters of the stand-in signal, frozen at propagate time. The in-plane
/// angles all collapse into one starting phase.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Ephemeris {
    epoch: Epoch,
    n_rad_s: f64,
    sma_km: f64,
    inc_rad: f64,
    phase0_rad: f64,
}

#[derive(Clone, Debug)]
enum Body {
    Scenario {
        name: String,
        window: Option<(Epoch, Epoch)>,
        children: Vec<usize>,
    },
    Facility {
        name: String,
        lat_rad: f64,
        lon_rad: f64,
        alt_km: f64,
    },
    Satellite {
        name: String,
        propagator: Option<usize>,
    },
    Propagator {
        kind: PropagatorKind,
        owner: usize,
        epoch: Option<Epoch>,
        layout: StateLayout,
        state: ClassicalRecord,
        ephemeris: Option<Ephemeris>,
    },
    /// A detached state representation, inert until assigned back.
    Representation {
        parent: usize,
        parent_generation: u32,
        layout: StateLayout,
        state: ClassicalRecord,
    },
    ProviderGroup {
        owner: usize,
        name: String,
    },
    Provider {
        owner: usize,
        path: String,
        timevar: bool,
    },
}

#[derive(Clone, Debug)]
struct SimObject {
    generation: u32,
    body: Body,
}

/// The in-process stand-in for an external analysis application.
#[derive(Default)]
pub struct SimModel {
    connected: bool,
    units: Option<SharedUnits>,
    objects: Vec<SimObject>,
    scenario: Option<usize>,
}

impl SimModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_units(&self) -> UnitPreferences {
        self.units
            .as_ref()
            .map_or_else(UnitPreferences::default, |u| *u.borrow())
    }

    fn ensure_connected(&self) -> Result<(), ModelError> {
        ensure!(self.connected, NotConnectedSnafu);
        Ok(())
    }

    fn alloc(&mut self, body: Body) -> Handle {
        let id = self.objects.len();
        self.objects.push(SimObject {
            generation: 0,
            body,
        });
        Handle {
            id,
            generation: 0,
            capability: Capability::Generic,
        }
    }

    fn name_of(&self, id: usize) -> String {
        match self.objects.get(id).map(|o| &o.body) {
            Some(Body::Scenario { name, .. }) => format!("scenario {name}"),
            Some(Body::Facility { name, .. }) => format!("facility {name}"),
            Some(Body::Satellite { name, .. }) => format!("satellite {name}"),
            Some(Body::Propagator { kind, owner, .. }) => {
                format!("{kind} propagator of {}", self.name_of(*owner))
            }
            Some(Body::Representation { parent, .. }) => {
                format!("state representation of {}", self.name_of(*parent))
            }
            Some(Body::ProviderGroup { name, owner }) => {
                format!("provider group {name} of {}", self.name_of(*owner))
            }
            Some(Body::Provider { path, owner, .. }) => {
                format!("provider {path} of {}", self.name_of(*owner))
            }
            None => format!("#{id}"),
        }
    }

    /// Generation-checked object lookup. A stale or unknown handle surfaces
    /// as a capability error, exactly like a cast on a dead automation
    /// pointer.
    fn resolve(&self, handle: &Handle) -> Result<&SimObject, CapabilityError> {
        match self.objects.get(handle.id) {
            Some(obj) if obj.generation == handle.generation => Ok(obj),
            _ => UnsupportedSnafu {
                object: self.name_of(handle.id),
                capability: handle.capability,
            }
            .fail(),
        }
    }

    fn supports(body: &Body, capability: Capability) -> bool {
        match capability {
            Capability::Generic => true,
            Capability::Scenario => matches!(body, Body::Scenario { .. }),
            Capability::Facility => matches!(body, Body::Facility { .. }),
            Capability::Satellite => matches!(body, Body::Satellite { .. }),
            Capability::Propagator(req) => {
                matches!(body, Body::Propagator { kind, .. } if *kind == req)
            }
            Capability::ClassicalState => matches!(body, Body::Representation { .. }),
            Capability::ProviderGroup => matches!(body, Body::ProviderGroup { .. }),
            Capability::ProviderTimeVar => matches!(body, Body::Provider { timevar: true, .. }),
            Capability::ProviderFixed => matches!(body, Body::Provider { timevar: false, .. }),
        }
    }

    fn unsupported(&self, id: usize, capability: Capability) -> ModelError {
        ModelError::Capability {
            source: CapabilityError::Unsupported {
                object: self.name_of(id),
                capability,
            },
        }
    }

    /// Resolves a handle and requires it to have been narrowed to `cap`.
    fn expect(&self, handle: &Handle, cap: Capability) -> Result<usize, ModelError> {
        self.ensure_connected()?;
        self.resolve(handle).context(CapabilitySnafu)?;
        if handle.capability != cap {
            return Err(self.unsupported(handle.id, cap));
        }
        Ok(handle.id)
    }

    /// Propagator calls require a live handle narrowed to the kind the
    /// object is currently configured for.
    fn expect_propagator(&self, handle: &Handle) -> Result<usize, ModelError> {
        self.ensure_connected()?;
        self.resolve(handle).context(CapabilitySnafu)?;
        match (&self.objects[handle.id].body, handle.capability) {
            (Body::Propagator { kind, .. }, Capability::Propagator(req)) if *kind == req => {
                Ok(handle.id)
            }
            (Body::Propagator { kind, .. }, _) => {
                Err(self.unsupported(handle.id, Capability::Propagator(*kind)))
            }
            _ => Err(self.unsupported(handle.id, handle.capability)),
        }
    }

    fn scenario_id(&self) -> Result<usize, ModelError> {
        self.scenario.context(NoScenarioLoadedSnafu)
    }

    fn scenario_window(&self) -> Option<(Epoch, Epoch)> {
        let id = self.scenario?;
        match &self.objects[id].body {
            Body::Scenario { window, .. } => *window,
            _ => None,
        }
    }

    /// The satellite ephemeris behind a provider object.
    fn ephemeris_of(&self, provider_id: usize) -> Result<Ephemeris, ModelError> {
        let owner = match &self.objects[provider_id].body {
            Body::Provider { owner, .. } => *owner,
            _ => return Err(self.unsupported(provider_id, Capability::ProviderTimeVar)),
        };
        let (sat_name, propagator) = match &self.objects[owner].body {
            Body::Satellite { name, propagator } => (name.clone(), *propagator),
            _ => return Err(self.unsupported(owner, Capability::Satellite)),
        };
        let prop = propagator.context(NoPropagatorSnafu {
            object: sat_name.clone(),
        })?;
        match &self.objects[prop].body {
            Body::Propagator {
                ephemeris: Some(eph),
                ..
            } => Ok(*eph),
            _ => NotPropagatedSnafu { object: sat_name }.fail(),
        }
    }

    fn provider_elements(timevar: bool) -> Vec<String> {
        let names: &[&str] = if timevar {
            &TIMEVAR_ELEMENTS
        } else {
            &FIXED_ELEMENTS
        };
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Stand-in Cartesian sample, scaled to the active units. A smooth
    /// circular track, not an orbit model.
    fn sample(&self, eph: &Ephemeris, velocity: bool, epoch: Epoch) -> Vector3<f64> {
        let m = eph.phase0_rad + eph.n_rad_s * (epoch - eph.epoch).to_seconds();
        let units = self.active_units();
        if velocity {
            let v_km_s = eph.n_rad_s * eph.sma_km;
            let scale = v_km_s / units.distance.km_per_unit() * units.time.sec_per_unit();
            Vector3::new(
                -scale * m.sin(),
                scale * m.cos() * eph.inc_rad.cos(),
                scale * m.cos() * eph.inc_rad.sin(),
            )
        } else {
            let r = eph.sma_km / units.distance.km_per_unit();
            Vector3::new(
                r * m.cos(),
                r * m.sin() * eph.inc_rad.cos(),
                r * m.sin() * eph.inc_rad.sin(),
            )
        }
    }

    fn axis_of(provider_name: &str, element: &str) -> Result<usize, ModelError> {
        match element.to_ascii_lowercase().as_str() {
            "x" => Ok(0),
            "y" => Ok(1),
            "z" => Ok(2),
            _ => UnknownElementSnafu {
                provider: provider_name.to_string(),
                element: element.to_string(),
            }
            .fail(),
        }
    }
}

impl AutomationModel for SimModel {
    fn connect(&mut self, window: &WindowCfg, units: SharedUnits) -> Result<(), ConnectionError> {
        ensure!(!self.connected, AlreadyConnectedSnafu);
        info!(
            "application up, {}x{} at ({}, {}), visible: {}",
            window.width, window.height, window.left, window.top, window.visible
        );
        self.connected = true;
        self.units = Some(units);
        self.objects.clear();
        self.scenario = None;
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.connected {
            info!("application released");
        }
        self.connected = false;
        self.units = None;
        self.objects.clear();
        self.scenario = None;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn narrow(&self, handle: &Handle, capability: Capability) -> Result<Handle, CapabilityError> {
        let obj = self.resolve(handle)?;
        ensure!(
            Self::supports(&obj.body, capability),
            UnsupportedSnafu {
                object: self.name_of(handle.id),
                capability,
            }
        );
        Ok(Handle {
            id: handle.id,
            generation: handle.generation,
            capability,
        })
    }

    fn new_scenario(&mut self, name: &str) -> Result<Handle, ModelError> {
        self.ensure_connected()?;
        if let Some(id) = self.scenario {
            return ScenarioLoadedSnafu {
                name: match &self.objects[id].body {
                    Body::Scenario { name, .. } => name.clone(),
                    _ => self.name_of(id),
                },
            }
            .fail();
        }
        let handle = self.alloc(Body::Scenario {
            name: name.to_string(),
            window: None,
            children: Vec::new(),
        });
        self.scenario = Some(handle.id);
        debug!("scenario {name} created");
        Ok(handle)
    }

    fn close_scenario(&mut self) -> Result<(), ModelError> {
        self.ensure_connected()?;
        let id = self.scenario_id()?;
        debug!("{} closed", self.name_of(id));
        self.scenario = None;
        // Closing orphans the scenario's whole subtree.
        self.objects.clear();
        Ok(())
    }

    fn set_time_period(
        &mut self,
        scenario: &Handle,
        start: &str,
        stop: &str,
    ) -> Result<(), ModelError> {
        let id = self.expect(scenario, Capability::Scenario)?;
        let start = timefmt::parse_epoch(start).context(BadTimestampSnafu)?;
        let stop = timefmt::parse_epoch(stop).context(BadTimestampSnafu)?;
        ensure!(
            stop > start,
            QueryRejectedSnafu {
                msg: format!("analysis interval stop {stop} not after start {start}"),
            }
        );
        if let Body::Scenario { window, .. } = &mut self.objects[id].body {
            *window = Some((start, stop));
        }
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), ModelError> {
        self.ensure_connected()?;
        let id = self.scenario_id()?;
        debug!("{} rewound to start", self.name_of(id));
        Ok(())
    }

    fn new_child(
        &mut self,
        scenario: &Handle,
        kind: EntityKind,
        name: &str,
    ) -> Result<Handle, ModelError> {
        self.ensure_connected()?;
        self.resolve(scenario).context(CapabilitySnafu)?;
        let id = scenario.id;
        let children = match &self.objects[id].body {
            Body::Scenario { children, .. } => children.clone(),
            _ => return Err(self.unsupported(id, Capability::Scenario)),
        };
        for child in children {
            let clash = match &self.objects[child].body {
                Body::Facility { name: n, .. } => {
                    kind == EntityKind::Facility && n.eq_ignore_ascii_case(name)
                }
                Body::Satellite { name: n, .. } => {
                    kind == EntityKind::Satellite && n.eq_ignore_ascii_case(name)
                }
                _ => false,
            };
            ensure!(!clash, DuplicateNameSnafu { kind, name });
        }
        let handle = self.alloc(match kind {
            EntityKind::Facility => Body::Facility {
                name: name.to_string(),
                lat_rad: 0.0,
                lon_rad: 0.0,
                alt_km: 0.0,
            },
            EntityKind::Satellite => Body::Satellite {
                name: name.to_string(),
                propagator: None,
            },
        });
        if let Body::Scenario { children, .. } = &mut self.objects[id].body {
            children.push(handle.id);
        }
        debug!("{kind} {name} inserted");
        Ok(handle)
    }

    fn assign_geodetic(
        &mut self,
        facility: &Handle,
        lat: f64,
        lon: f64,
        alt: f64,
    ) -> Result<(), ModelError> {
        let id = self.expect(facility, Capability::Facility)?;
        let units = self.active_units();
        if let Body::Facility {
            lat_rad,
            lon_rad,
            alt_km,
            ..
        } = &mut self.objects[id].body
        {
            *lat_rad = lat * units.angle.rad_per_unit();
            *lon_rad = lon * units.angle.rad_per_unit();
            *alt_km = alt * units.distance.km_per_unit();
        }
        Ok(())
    }

    fn set_propagator(
        &mut self,
        satellite: &Handle,
        kind: PropagatorKind,
    ) -> Result<(), ModelError> {
        let id = self.expect(satellite, Capability::Satellite)?;
        let previous = match &self.objects[id].body {
            Body::Satellite { propagator, .. } => *propagator,
            _ => None,
        };
        if let Some(old) = previous {
            // Stale out every handle minted for the discarded configuration.
            self.objects[old].generation += 1;
            debug!("{} discarded", self.name_of(old));
        }
        let prop = self.alloc(Body::Propagator {
            kind,
            owner: id,
            epoch: None,
            layout: StateLayout {
                size_shape: SizeShapeKind::SemiMajorAxis,
                asc_node: AscNodeKind::Raan,
                location: LocationKind::MeanAnomaly,
            },
            state: ClassicalRecord::default(),
            ephemeris: None,
        });
        if let Body::Satellite { propagator, .. } = &mut self.objects[id].body {
            *propagator = Some(prop.id);
        }
        Ok(())
    }

    fn propagator_of(&self, satellite: &Handle) -> Result<Handle, ModelError> {
        let id = self.expect(satellite, Capability::Satellite)?;
        let (name, propagator) = match &self.objects[id].body {
            Body::Satellite { name, propagator } => (name.clone(), *propagator),
            _ => unreachable!(),
        };
        let prop = propagator.context(NoPropagatorSnafu { object: name })?;
        Ok(Handle {
            id: prop,
            generation: self.objects[prop].generation,
            capability: Capability::Generic,
        })
    }

    fn set_epoch(&mut self, propagator: &Handle, epoch: &str) -> Result<(), ModelError> {
        let id = self.expect_propagator(propagator)?;
        let parsed = timefmt::parse_epoch(epoch).context(BadTimestampSnafu)?;
        if let Body::Propagator { epoch, .. } = &mut self.objects[id].body {
            *epoch = Some(parsed);
        }
        Ok(())
    }

    fn convert_to_classical(&mut self, propagator: &Handle) -> Result<Handle, ModelError> {
        let id = self.expect_propagator(propagator)?;
        let (layout, state, generation) = match &self.objects[id].body {
            Body::Propagator { layout, state, .. } => (*layout, *state, self.objects[id].generation),
            _ => unreachable!(),
        };
        Ok(self.alloc(Body::Representation {
            parent: id,
            parent_generation: generation,
            layout,
            state,
        }))
    }

    fn set_state_layout(&mut self, rep: &Handle, layout: StateLayout) -> Result<(), ModelError> {
        let id = self.expect(rep, Capability::ClassicalState)?;
        let (parent, parent_generation) = match &self.objects[id].body {
            Body::Representation {
                parent,
                parent_generation,
                ..
            } => (*parent, *parent_generation),
            _ => unreachable!(),
        };
        if self.objects[parent].generation != parent_generation {
            return Err(self.unsupported(id, Capability::ClassicalState));
        }
        if let Body::Representation {
            layout: current, ..
        } = &mut self.objects[id].body
        {
            *current = layout;
        }
        Ok(())
    }

    fn set_state_element(
        &mut self,
        rep: &Handle,
        element: StateElement,
        value: f64,
    ) -> Result<(), ModelError> {
        let id = self.expect(rep, Capability::ClassicalState)?;
        let units = self.active_units();
        let (layout, parent, parent_generation) = match &self.objects[id].body {
            Body::Representation {
                layout,
                parent,
                parent_generation,
                ..
            } => (*layout, *parent, *parent_generation),
            _ => unreachable!(),
        };
        // A representation converted from a discarded configuration is dead.
        if self.objects[parent].generation != parent_generation {
            return Err(self.unsupported(id, Capability::ClassicalState));
        }
        let in_layout = match element {
            StateElement::MeanMotion => layout.size_shape == SizeShapeKind::MeanMotion,
            StateElement::SemiMajorAxis => layout.size_shape == SizeShapeKind::SemiMajorAxis,
            StateElement::Eccentricity
            | StateElement::Inclination
            | StateElement::ArgOfPerigee => true,
            StateElement::Raan => layout.asc_node == AscNodeKind::Raan,
            StateElement::Lan => layout.asc_node == AscNodeKind::Lan,
            StateElement::MeanAnomaly => layout.location == LocationKind::MeanAnomaly,
            StateElement::TrueAnomaly => layout.location == LocationKind::TrueAnomaly,
        };
        ensure!(in_layout, LayoutMismatchSnafu { element });

        let rad = units.angle.rad_per_unit();
        if let Body::Representation { state, .. } = &mut self.objects[id].body {
            match element {
                StateElement::MeanMotion => {
                    state.mean_motion_rad_s = value * rad / units.time.sec_per_unit()
                }
                StateElement::Eccentricity => state.ecc = value,
                StateElement::SemiMajorAxis => state.sma_km = value * units.distance.km_per_unit(),
                StateElement::Inclination => state.inc_rad = value * rad,
                StateElement::ArgOfPerigee => state.aop_rad = value * rad,
                StateElement::Raan | StateElement::Lan => state.node_rad = value * rad,
                StateElement::MeanAnomaly | StateElement::TrueAnomaly => {
                    state.anomaly_rad = value * rad
                }
            }
        }
        Ok(())
    }

    fn assign_state(&mut self, propagator: &Handle, rep: &Handle) -> Result<(), ModelError> {
        let prop_id = self.expect_propagator(propagator)?;
        let rep_id = self.expect(rep, Capability::ClassicalState)?;
        let (parent, parent_generation, layout, state) = match &self.objects[rep_id].body {
            Body::Representation {
                parent,
                parent_generation,
                layout,
                state,
            } => (*parent, *parent_generation, *layout, *state),
            _ => unreachable!(),
        };
        if parent != prop_id || self.objects[parent].generation != parent_generation {
            return Err(self.unsupported(rep_id, Capability::ClassicalState));
        }
        if let Body::Propagator {
            layout: cfg_layout,
            state: cfg_state,
            ..
        } = &mut self.objects[prop_id].body
        {
            *cfg_layout = layout;
            *cfg_state = state;
        }
        Ok(())
    }

    fn propagate(&mut self, propagator: &Handle) -> Result<(), ModelError> {
        let id = self.expect_propagator(propagator)?;
        let object = self.name_of(id);
        ensure!(
            self.scenario_window().is_some(),
            QueryRejectedSnafu {
                msg: "scenario analysis interval not set".to_string(),
            }
        );
        let (epoch, layout, state) = match &self.objects[id].body {
            Body::Propagator {
                epoch,
                layout,
                state,
                ..
            } => (*epoch, *layout, *state),
            _ => unreachable!(),
        };
        let reject = |msg: String| {
            PropagationFailedSnafu {
                object: object.clone(),
                msg,
            }
            .fail()
        };
        let epoch = match epoch {
            Some(e) => e,
            None => return reject("initial state epoch not set".to_string()),
        };
        if !(0.0..1.0).contains(&state.ecc) {
            return reject(format!("eccentricity {} outside [0, 1)", state.ecc));
        }
        let (n_rad_s, sma_km) = match layout.size_shape {
            SizeShapeKind::MeanMotion => {
                if state.mean_motion_rad_s <= 0.0 {
                    return reject(format!(
                        "mean motion {} rad/s is not positive",
                        state.mean_motion_rad_s
                    ));
                }
                let n = state.mean_motion_rad_s;
                (n, (GM_EARTH_KM3_S2 / (n * n)).cbrt())
            }
            SizeShapeKind::SemiMajorAxis => {
                if state.sma_km <= 0.0 {
                    return reject(format!(
                        "semi-major axis {} km is not positive",
                        state.sma_km
                    ));
                }
                let a = state.sma_km;
                ((GM_EARTH_KM3_S2 / (a * a * a)).sqrt(), a)
            }
        };
        if let Body::Propagator { ephemeris, .. } = &mut self.objects[id].body {
            *ephemeris = Some(Ephemeris {
                epoch,
                n_rad_s,
                sma_km,
                inc_rad: state.inc_rad,
                phase0_rad: state.node_rad + state.aop_rad + state.anomaly_rad,
            });
        }
        info!("{object} propagated over the scenario interval");
        Ok(())
    }

    fn data_provider(&mut self, entity: &Handle, name: &str) -> Result<Handle, ModelError> {
        self.ensure_connected()?;
        self.resolve(entity).context(CapabilitySnafu)?;
        let id = entity.id;
        let is_satellite = match &self.objects[id].body {
            Body::Satellite { .. } => true,
            Body::Facility { .. } => false,
            _ => return Err(self.unsupported(id, entity.capability)),
        };
        // One transient wrapper object per lookup, like a real automation
        // server handing out pointers.
        if is_satellite {
            ensure!(
                name.eq_ignore_ascii_case("Cartesian Velocity")
                    || name.eq_ignore_ascii_case("Cartesian Position"),
                UnknownProviderSnafu {
                    object: self.name_of(id),
                    name,
                }
            );
            Ok(self.alloc(Body::ProviderGroup {
                owner: id,
                name: name.to_string(),
            }))
        } else {
            ensure!(
                name.eq_ignore_ascii_case("Cartesian Position"),
                UnknownProviderSnafu {
                    object: self.name_of(id),
                    name,
                }
            );
            Ok(self.alloc(Body::Provider {
                owner: id,
                path: name.to_string(),
                timevar: false,
            }))
        }
    }

    fn provider_item(&mut self, group: &Handle, item: &str) -> Result<Handle, ModelError> {
        let id = self.expect(group, Capability::ProviderGroup)?;
        let (owner, group_name) = match &self.objects[id].body {
            Body::ProviderGroup { owner, name } => (*owner, name.clone()),
            _ => unreachable!(),
        };
        ensure!(
            item.eq_ignore_ascii_case("J2000") || item.eq_ignore_ascii_case("Fixed"),
            UnknownProviderItemSnafu {
                group: group_name,
                item,
            }
        );
        Ok(self.alloc(Body::Provider {
            owner,
            path: format!("{group_name}//{item}"),
            timevar: true,
        }))
    }

    fn elements_of(&self, provider: &Handle) -> Result<Vec<String>, ModelError> {
        self.ensure_connected()?;
        let obj = self.resolve(provider).context(CapabilitySnafu)?;
        match &obj.body {
            Body::Provider { timevar, .. } => Ok(Self::provider_elements(*timevar)),
            _ => Err(self.unsupported(provider.id, Capability::ProviderTimeVar)),
        }
    }

    fn exec_elements(
        &mut self,
        provider: &Handle,
        start: &str,
        stop: &str,
        step_s: f64,
        elements: &[String],
    ) -> Result<Vec<ColumnData>, ModelError> {
        let id = self.expect(provider, Capability::ProviderTimeVar)?;
        let start = timefmt::parse_epoch(start).context(BadTimestampSnafu)?;
        let stop = timefmt::parse_epoch(stop).context(BadTimestampSnafu)?;
        ensure!(
            stop > start && step_s > 0.0,
            QueryRejectedSnafu {
                msg: format!("bad query window {start} .. {stop} step {step_s} s"),
            }
        );
        let velocity = match &self.objects[id].body {
            Body::Provider { path, .. } => path.to_ascii_lowercase().contains("velocity"),
            _ => unreachable!(),
        };
        let eph = self.ephemeris_of(id)?;
        let provider_name = self.name_of(id);
        let epochs: Vec<Epoch> =
            TimeSeries::inclusive(start, stop, step_s * Unit::Second).collect();
        let mut columns = Vec::with_capacity(elements.len());
        for element in elements {
            if element.eq_ignore_ascii_case("Time") {
                columns.push(ColumnData::Epochs(epochs.clone()));
                continue;
            }
            let axis = Self::axis_of(&provider_name, element)?;
            columns.push(ColumnData::Reals(
                epochs
                    .iter()
                    .map(|e| self.sample(&eph, velocity, *e)[axis])
                    .collect(),
            ));
        }
        debug!(
            "{} produced {} rows for {} elements",
            provider_name,
            epochs.len(),
            elements.len()
        );
        Ok(columns)
    }

    fn exec_fixed(
        &mut self,
        provider: &Handle,
        elements: &[String],
    ) -> Result<Vec<ColumnData>, ModelError> {
        let id = self.expect(provider, Capability::ProviderFixed)?;
        let owner = match &self.objects[id].body {
            Body::Provider { owner, .. } => *owner,
            _ => unreachable!(),
        };
        let (lat, lon, alt) = match &self.objects[owner].body {
            Body::Facility {
                lat_rad,
                lon_rad,
                alt_km,
                ..
            } => (*lat_rad, *lon_rad, *alt_km),
            _ => return Err(self.unsupported(owner, Capability::Facility)),
        };
        let r = (EARTH_RADIUS_KM + alt) / self.active_units().distance.km_per_unit();
        let pos = Vector3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        );
        let provider_name = self.name_of(id);
        let mut columns = Vec::with_capacity(elements.len());
        for element in elements {
            let axis = Self::axis_of(&provider_name, element)?;
            columns.push(ColumnData::Reals(vec![pos[axis]]));
        }
        Ok(columns)
    }
}
