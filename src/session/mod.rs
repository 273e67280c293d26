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

//! The session façade: high-level, typed operations over one application
//! instance.
//!
//! One [Session] drives one application. Every call is a blocking round trip
//! and calls never overlap. Opening is scoped: dropping the session releases
//! the application even when an operation failed mid-way.

use crate::io::{ConfigError, SessionCfg};
use crate::model::{
    timefmt, AutomationModel, Capability, CapabilityError, ConnectionError, EntityKind, Handle,
    ModelError, PropagatorKind, StateElement,
};
use crate::series::{self, ExtractionError, SeriesTable};
use crate::time::{Duration, Epoch};
use crate::units::{self, AngleUnit, DistanceUnit, SharedUnits, TimeUnit, UnitOverride};
use snafu::prelude::*;
use std::rc::Rc;

mod state;
pub use state::{AscNode, ClassicalElements, GeodeticPosition, Location, SizeShape};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("could not reach the application: {source}"))]
    Connection { source: ConnectionError },
    #[snafu(display("invalid session configuration: {source}"))]
    Config { source: ConfigError },
    #[snafu(display("{source}"))]
    Narrowing { source: CapabilityError },
    #[snafu(display("automation call on `{object}` failed: {source}"))]
    Automation { object: String, source: ModelError },
    #[snafu(display("no active scenario"))]
    NoScenario,
    #[snafu(display("scenario `{name}` is already active, close it first"))]
    ScenarioActive { name: String },
    #[snafu(display("propagation of `{entity}` failed: {msg}"))]
    Propagation { entity: String, msg: String },
    #[snafu(display("extraction from `{provider}` failed: {source}"))]
    Extraction {
        provider: String,
        source: ExtractionError,
    },
}

/// A typed reference to an entity owned by the active scenario.
#[derive(Clone, Debug)]
pub struct Entity {
    pub(crate) handle: Handle,
    kind: EntityKind,
    name: String,
}

impl Entity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> EntityKind {
        self.kind
    }
}

struct ActiveScenario {
    handle: Handle,
    name: String,
    start: Epoch,
    stop: Epoch,
}

/// One connection to one external application instance.
pub struct Session<M: AutomationModel> {
    model: M,
    units: SharedUnits,
    scenario: Option<ActiveScenario>,
}

impl<M: AutomationModel> Session<M> {
    /// Opens the application and hands it the initial unit preferences.
    pub fn connect(mut model: M, cfg: SessionCfg) -> Result<Self, SessionError> {
        cfg.validate().context(ConfigSnafu)?;
        let units = units::shared(cfg.units);
        model
            .connect(&cfg.window, Rc::clone(&units))
            .context(ConnectionSnafu)?;
        info!("session open, units {}", units.borrow());
        Ok(Self {
            model,
            units,
            scenario: None,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.model.is_connected()
    }

    /// The unit preference table shared with the application.
    pub fn units(&self) -> SharedUnits {
        Rc::clone(&self.units)
    }

    /// Runs `body` with the given units active, restoring the prior units on
    /// every exit path. Nested calls unwind in order.
    pub fn with_units<T, E, F>(&mut self, overrides: &[UnitOverride], body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let table = Rc::clone(&self.units);
        units::with_units(&table, overrides, || body(self))
    }

    /// Creates the one scenario this session drives and sets its analysis
    /// interval. Fails if a scenario is already active.
    pub fn new_scenario(
        &mut self,
        name: &str,
        start: Epoch,
        stop: Epoch,
    ) -> Result<(), SessionError> {
        if let Some(sc) = &self.scenario {
            return ScenarioActiveSnafu {
                name: sc.name.clone(),
            }
            .fail();
        }
        let handle = self
            .model
            .new_scenario(name)
            .context(AutomationSnafu { object: name })?;
        let narrowed = self
            .model
            .narrow(&handle, Capability::Scenario)
            .context(NarrowingSnafu)?;
        self.model
            .set_time_period(
                &narrowed,
                &timefmt::format_epoch(start),
                &timefmt::format_epoch(stop),
            )
            .context(AutomationSnafu { object: name })?;
        self.model
            .rewind()
            .context(AutomationSnafu { object: name })?;
        info!("scenario {name} active over {start} .. {stop}");
        self.scenario = Some(ActiveScenario {
            handle,
            name: name.to_string(),
            start,
            stop,
        });
        Ok(())
    }

    /// Analysis interval of the active scenario, if any.
    pub fn scenario_window(&self) -> Option<(Epoch, Epoch)> {
        self.scenario.as_ref().map(|sc| (sc.start, sc.stop))
    }

    pub fn close_scenario(&mut self) -> Result<(), SessionError> {
        let sc = self.scenario.take().context(NoScenarioSnafu)?;
        self.model.close_scenario().context(AutomationSnafu {
            object: sc.name.as_str(),
        })?;
        info!("scenario {} closed", sc.name);
        Ok(())
    }

    /// Inserts a ground facility at a fixed geodetic position.
    pub fn add_facility(
        &mut self,
        name: &str,
        position: GeodeticPosition,
    ) -> Result<Entity, SessionError> {
        let scenario = self.scenario.as_ref().context(NoScenarioSnafu)?.handle.clone();
        let handle = self
            .model
            .new_child(&scenario, EntityKind::Facility, name)
            .context(AutomationSnafu { object: name })?;
        let narrowed = self
            .model
            .narrow(&handle, Capability::Facility)
            .context(NarrowingSnafu)?;
        let table = Rc::clone(&self.units);
        units::with_units(
            &table,
            &[
                UnitOverride::Angle(AngleUnit::Degrees),
                UnitOverride::Distance(DistanceUnit::Kilometers),
            ],
            || {
                self.model.assign_geodetic(
                    &narrowed,
                    position.lat_deg,
                    position.lon_deg,
                    position.alt_km,
                )
            },
        )
        .context(AutomationSnafu { object: name })?;
        info!("facility {name} at {position}");
        Ok(Entity {
            handle,
            kind: EntityKind::Facility,
            name: name.to_string(),
        })
    }

    /// Inserts an orbiting vehicle. It has no propagator until
    /// [configure_propagator](Self::configure_propagator) selects one.
    pub fn add_satellite(&mut self, name: &str) -> Result<Entity, SessionError> {
        let scenario = self.scenario.as_ref().context(NoScenarioSnafu)?.handle.clone();
        let handle = self
            .model
            .new_child(&scenario, EntityKind::Satellite, name)
            .context(AutomationSnafu { object: name })?;
        info!("satellite {name} inserted");
        Ok(Entity {
            handle,
            kind: EntityKind::Satellite,
            name: name.to_string(),
        })
    }

    /// Selects a propagator kind, loads the classical element set into its
    /// initial state and runs the engine's propagation.
    ///
    /// Internally this follows the engine's own protocol: narrow to the
    /// kind-specific configuration, set the epoch, convert the initial state
    /// to a detached classical representation, fill it under the matching
    /// unit scopes, re-assign it, then propagate. Values entered while the
    /// wrong unit is active would be silently misread by the engine, hence
    /// the scope guards around every dimensioned write.
    pub fn configure_propagator(
        &mut self,
        satellite: &Entity,
        kind: PropagatorKind,
        elements: &ClassicalElements,
    ) -> Result<(), SessionError> {
        let object = satellite.name.clone();
        let sat = self
            .model
            .narrow(&satellite.handle, Capability::Satellite)
            .context(NarrowingSnafu)?;
        self.model
            .set_propagator(&sat, kind)
            .context(AutomationSnafu {
                object: object.as_str(),
            })?;
        let prop = self.model.propagator_of(&sat).context(AutomationSnafu {
            object: object.as_str(),
        })?;
        let prop = self
            .model
            .narrow(&prop, Capability::Propagator(kind))
            .context(NarrowingSnafu)?;
        self.model
            .set_epoch(&prop, &timefmt::format_epoch(elements.epoch))
            .context(AutomationSnafu {
                object: object.as_str(),
            })?;

        let rep = self
            .model
            .convert_to_classical(&prop)
            .context(AutomationSnafu {
                object: object.as_str(),
            })?;
        let rep = self
            .model
            .narrow(&rep, Capability::ClassicalState)
            .context(NarrowingSnafu)?;
        self.model
            .set_state_layout(&rep, elements.layout())
            .context(AutomationSnafu {
                object: object.as_str(),
            })?;

        let table = Rc::clone(&self.units);
        match elements.size_shape {
            SizeShape::MeanMotion { revs_per_day, ecc } => units::with_units(
                &table,
                &[
                    UnitOverride::Angle(AngleUnit::Revolutions),
                    UnitOverride::Time(TimeUnit::Days),
                ],
                || {
                    self.model
                        .set_state_element(&rep, StateElement::MeanMotion, revs_per_day)?;
                    self.model
                        .set_state_element(&rep, StateElement::Eccentricity, ecc)
                },
            ),
            SizeShape::SemiMajorAxis { sma_km, ecc } => units::with_units(
                &table,
                &[UnitOverride::Distance(DistanceUnit::Kilometers)],
                || {
                    self.model
                        .set_state_element(&rep, StateElement::SemiMajorAxis, sma_km)?;
                    self.model
                        .set_state_element(&rep, StateElement::Eccentricity, ecc)
                },
            ),
        }
        .context(AutomationSnafu {
            object: object.as_str(),
        })?;

        units::with_units(
            &table,
            &[UnitOverride::Angle(AngleUnit::Degrees)],
            || {
                self.model
                    .set_state_element(&rep, StateElement::Inclination, elements.inc_deg)?;
                self.model
                    .set_state_element(&rep, StateElement::ArgOfPerigee, elements.aop_deg)?;
                match elements.asc_node {
                    AscNode::Raan { raan_deg } => {
                        self.model
                            .set_state_element(&rep, StateElement::Raan, raan_deg)?
                    }
                    AscNode::Lan { lan_deg } => {
                        self.model
                            .set_state_element(&rep, StateElement::Lan, lan_deg)?
                    }
                }
                match elements.location {
                    Location::MeanAnomaly { deg } => {
                        self.model
                            .set_state_element(&rep, StateElement::MeanAnomaly, deg)
                    }
                    Location::TrueAnomaly { deg } => {
                        self.model
                            .set_state_element(&rep, StateElement::TrueAnomaly, deg)
                    }
                }
            },
        )
        .context(AutomationSnafu {
            object: object.as_str(),
        })?;

        self.model
            .assign_state(&prop, &rep)
            .context(AutomationSnafu {
                object: object.as_str(),
            })?;
        self.model.propagate(&prop).map_err(|err| match err {
            ModelError::PropagationFailed { msg, .. } => SessionError::Propagation {
                entity: object.clone(),
                msg,
            },
            source => SessionError::Automation {
                object: object.clone(),
                source,
            },
        })?;
        info!("{object} configured with {kind} and propagated");
        Ok(())
    }

    /// Pulls a time-varying series from a named provider group item over the
    /// scenario's analysis interval.
    pub fn fetch_series(
        &mut self,
        entity: &Entity,
        group: &str,
        item: &str,
        elements: &[&str],
        step: Duration,
    ) -> Result<SeriesTable, SessionError> {
        let (start, stop) = self.scenario_window().context(NoScenarioSnafu)?;
        let path = format!("{group}//{item}");
        let provider = self
            .model
            .data_provider(&entity.handle, group)
            .context(AutomationSnafu {
                object: entity.name.as_str(),
            })?;
        let provider = self
            .model
            .narrow(&provider, Capability::ProviderGroup)
            .context(NarrowingSnafu)?;
        let provider = self
            .model
            .provider_item(&provider, item)
            .context(AutomationSnafu {
                object: entity.name.as_str(),
            })?;
        let provider = self
            .model
            .narrow(&provider, Capability::ProviderTimeVar)
            .context(NarrowingSnafu)?;
        let names: Vec<String> = elements.iter().map(|el| el.to_string()).collect();
        let table = series::extract(&mut self.model, &provider, start, stop, step, &names)
            .context(ExtractionSnafu { provider: path })?;
        debug!("fetched {table} from {}", entity.name);
        Ok(table)
    }

    /// Pulls the single sample of a fixed provider, e.g. a facility position.
    pub fn fetch_fixed(
        &mut self,
        entity: &Entity,
        provider: &str,
        elements: &[&str],
    ) -> Result<SeriesTable, SessionError> {
        let handle = self
            .model
            .data_provider(&entity.handle, provider)
            .context(AutomationSnafu {
                object: entity.name.as_str(),
            })?;
        let handle = self
            .model
            .narrow(&handle, Capability::ProviderFixed)
            .context(NarrowingSnafu)?;
        let names: Vec<String> = elements.iter().map(|el| el.to_string()).collect();
        series::extract_fixed(&mut self.model, &handle, &names).context(ExtractionSnafu {
            provider: provider.to_string(),
        })
    }

    /// Releases the application. Idempotent, also run on drop.
    pub fn disconnect(&mut self) {
        if self.model.is_connected() {
            info!("session closing");
        }
        self.scenario = None;
        self.model.disconnect();
    }
}

impl<M: AutomationModel> Drop for Session<M> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
