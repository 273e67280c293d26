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

//! The automation object model boundary.
//!
//! An external analysis application exposes a tree of typed objects reachable
//! from one root. Each object supports a set of named capabilities which
//! depends on its kind *and on its current configuration*: a satellite only
//! exposes a J2 propagator interface once its propagator type is set to J2.
//! Handles are narrowed to a capability before capability-specific calls, and
//! are invalidated by any operation that changes the effective type of the
//! object they point to.
//!
//! All substantive computation happens on the far side of this boundary. The
//! [AutomationModel] trait is the only place the rest of this crate talks to
//! the application, and [crate::sim::SimModel] is the in-process stand-in used
//! by tests and demos.

use crate::io::WindowCfg;
use crate::time::Epoch;
use crate::units::SharedUnits;
use snafu::prelude::*;
use std::fmt;

pub mod timefmt;
pub use timefmt::EpochFormatError;

/// One column of data returned by an element query, exactly as provided by
/// the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Reals(Vec<f64>),
    Epochs(Vec<Epoch>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Reals(v) => v.len(),
            Self::Epochs(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kinds of entities a scenario can own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Facility,
    Satellite,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Facility => write!(f, "facility"),
            Self::Satellite => write!(f, "satellite"),
        }
    }
}

/// Propagator models selectable on a satellite.
///
/// Selecting a kind discards the previous kind's configuration entirely: the
/// engine re-creates the propagator object rather than migrating state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropagatorKind {
    TwoBody,
    J2Perturbation,
    J4Perturbation,
}

impl fmt::Display for PropagatorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TwoBody => write!(f, "TwoBody"),
            Self::J2Perturbation => write!(f, "J2Perturbation"),
            Self::J4Perturbation => write!(f, "J4Perturbation"),
        }
    }
}

/// The closed set of capabilities a handle can be narrowed to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    /// The default interface every live object exposes.
    Generic,
    Scenario,
    Facility,
    Satellite,
    /// Kind-specific propagator configuration. Requesting
    /// `Propagator(J4Perturbation)` on an object configured for J2 fails.
    Propagator(PropagatorKind),
    /// A detached classical (Keplerian) orbital state representation.
    ClassicalState,
    /// A group of related data providers, holding named items.
    ProviderGroup,
    /// A provider producing time-varying output over a bounded window.
    ProviderTimeVar,
    /// A provider producing a single, time-independent sample.
    ProviderFixed,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "Generic"),
            Self::Scenario => write!(f, "Scenario"),
            Self::Facility => write!(f, "Facility"),
            Self::Satellite => write!(f, "Satellite"),
            Self::Propagator(kind) => write!(f, "Propagator({kind})"),
            Self::ClassicalState => write!(f, "ClassicalState"),
            Self::ProviderGroup => write!(f, "ProviderGroup"),
            Self::ProviderTimeVar => write!(f, "ProviderTimeVar"),
            Self::ProviderFixed => write!(f, "ProviderFixed"),
        }
    }
}

/// An opaque reference into the application's object tree.
///
/// A handle remembers the capability it was narrowed to and the configuration
/// generation of the object it was minted for. The model rejects calls through
/// a handle whose generation is stale, so callers must re-narrow after any
/// operation that changes an object's effective type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handle {
    pub(crate) id: usize,
    pub(crate) generation: u32,
    pub(crate) capability: Capability,
}

impl Handle {
    pub const fn capability(&self) -> Capability {
        self.capability
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}<{}>", self.id, self.capability)
    }
}

/// Dimensioned fields of a classical orbital state representation.
///
/// Values assigned to these are interpreted under the unit preferences active
/// at the time of the call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StateElement {
    /// Angle per time, e.g. revs/day under (Revolutions, Days).
    MeanMotion,
    /// Dimensionless.
    Eccentricity,
    /// Distance.
    SemiMajorAxis,
    Inclination,
    ArgOfPerigee,
    Raan,
    Lan,
    MeanAnomaly,
    TrueAnomaly,
}

impl fmt::Display for StateElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Which parameterization each slot of a classical representation uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateLayout {
    pub size_shape: SizeShapeKind,
    pub asc_node: AscNodeKind,
    pub location: LocationKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeShapeKind {
    SemiMajorAxis,
    MeanMotion,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AscNodeKind {
    Raan,
    Lan,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocationKind {
    MeanAnomaly,
    TrueAnomaly,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConnectionError {
    #[snafu(display("application unreachable: {msg}"))]
    Unreachable { msg: String },
    #[snafu(display("already driving an application instance"))]
    AlreadyConnected,
}

/// Interface narrowing failure: the object does not expose the requested
/// capability in its current configuration, or the handle is stale.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CapabilityError {
    #[snafu(display("{object} does not expose {capability} in its current configuration"))]
    Unsupported {
        object: String,
        capability: Capability,
    },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ModelError {
    #[snafu(display("not connected to an application"))]
    NotConnected,
    #[snafu(display("no scenario is currently loaded"))]
    NoScenarioLoaded,
    #[snafu(display("scenario `{name}` is already loaded, close it first"))]
    ScenarioLoaded { name: String },
    #[snafu(display("a {kind} named `{name}` already exists in this scenario"))]
    DuplicateName { kind: EntityKind, name: String },
    #[snafu(display("{source}"))]
    Capability { source: CapabilityError },
    #[snafu(display("bad timestamp: {source}"))]
    BadTimestamp { source: EpochFormatError },
    #[snafu(display("cannot propagate `{object}`: {msg}"))]
    PropagationFailed { object: String, msg: String },
    #[snafu(display("`{object}` has no ephemeris, propagate it first"))]
    NotPropagated { object: String },
    #[snafu(display("`{object}` has no propagator selected"))]
    NoPropagator { object: String },
    #[snafu(display("element {element} is not part of the representation's current layout"))]
    LayoutMismatch { element: StateElement },
    #[snafu(display("engine rejected the request: {msg}"))]
    QueryRejected { msg: String },
    #[snafu(display("`{object}` has no data provider named `{name}`"))]
    UnknownProvider { object: String, name: String },
    #[snafu(display("provider group `{group}` has no item named `{item}`"))]
    UnknownProviderItem { group: String, item: String },
    #[snafu(display("element `{element}` is not exported by `{provider}`"))]
    UnknownElement { provider: String, element: String },
}

/// The automation surface of the external application.
///
/// One round trip per call, blocking, single caller per instance. Dimensioned
/// arguments (`assign_geodetic`, `set_state_element`) are interpreted under
/// the unit preferences shared at [connect](Self::connect) time; timestamps
/// cross as wire strings (see [timefmt]).
pub trait AutomationModel {
    /// Attaches to the application, handing over the shared unit table and
    /// the initial window placement.
    fn connect(&mut self, window: &WindowCfg, units: SharedUnits) -> Result<(), ConnectionError>;

    /// Releases the application. Idempotent.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Checked capability cast. Side-effect free and idempotent.
    fn narrow(&self, handle: &Handle, capability: Capability) -> Result<Handle, CapabilityError>;

    fn new_scenario(&mut self, name: &str) -> Result<Handle, ModelError>;
    fn close_scenario(&mut self) -> Result<(), ModelError>;
    /// Requires a handle narrowed to [Capability::Scenario].
    fn set_time_period(&mut self, scenario: &Handle, start: &str, stop: &str)
        -> Result<(), ModelError>;
    /// Resets the application's animation clock to the scenario start.
    fn rewind(&mut self) -> Result<(), ModelError>;

    /// Creates a child entity of the current scenario. The handle may carry
    /// any capability as long as it points to the scenario object.
    fn new_child(
        &mut self,
        scenario: &Handle,
        kind: EntityKind,
        name: &str,
    ) -> Result<Handle, ModelError>;

    /// Latitude and longitude under the active angle unit, altitude under the
    /// active distance unit. Requires [Capability::Facility].
    fn assign_geodetic(
        &mut self,
        facility: &Handle,
        lat: f64,
        lon: f64,
        alt: f64,
    ) -> Result<(), ModelError>;

    /// Selects the propagator model, discarding any previous propagator
    /// configuration and invalidating handles narrowed to it.
    fn set_propagator(
        &mut self,
        satellite: &Handle,
        kind: PropagatorKind,
    ) -> Result<(), ModelError>;

    /// Generic handle onto the satellite's current propagator object.
    fn propagator_of(&self, satellite: &Handle) -> Result<Handle, ModelError>;

    /// Requires a kind-specific [Capability::Propagator] handle.
    fn set_epoch(&mut self, propagator: &Handle, epoch: &str) -> Result<(), ModelError>;

    /// Converts the propagator's initial state into a *detached* classical
    /// representation. Mutating the representation is inert until it is
    /// re-assigned with [assign_state](Self::assign_state).
    fn convert_to_classical(&mut self, propagator: &Handle) -> Result<Handle, ModelError>;

    /// Requires [Capability::ClassicalState].
    fn set_state_layout(&mut self, rep: &Handle, layout: StateLayout) -> Result<(), ModelError>;

    /// Assigns one dimensioned field of a detached representation, interpreted
    /// under the active units. Requires [Capability::ClassicalState].
    fn set_state_element(
        &mut self,
        rep: &Handle,
        element: StateElement,
        value: f64,
    ) -> Result<(), ModelError>;

    /// Copies a detached representation into the propagator configuration.
    fn assign_state(&mut self, propagator: &Handle, rep: &Handle) -> Result<(), ModelError>;

    /// Runs the engine's propagation over the scenario window. The engine is
    /// the validation authority for the configured state.
    fn propagate(&mut self, propagator: &Handle) -> Result<(), ModelError>;

    /// Generic handle onto a named data provider (or provider group) of an
    /// entity. Mutable because the application mints a transient wrapper
    /// object per lookup.
    fn data_provider(&mut self, entity: &Handle, name: &str) -> Result<Handle, ModelError>;

    /// Resolves a named item inside a provider group, e.g. a reference frame.
    /// Requires [Capability::ProviderGroup].
    fn provider_item(&mut self, group: &Handle, item: &str) -> Result<Handle, ModelError>;

    /// Element names exported by a provider, in the provider's own order.
    fn elements_of(&self, provider: &Handle) -> Result<Vec<String>, ModelError>;

    /// Bounded element query of a time-varying provider. The engine's own
    /// sampling semantics are authoritative for the returned lengths.
    /// Requires [Capability::ProviderTimeVar].
    fn exec_elements(
        &mut self,
        provider: &Handle,
        start: &str,
        stop: &str,
        step_s: f64,
        elements: &[String],
    ) -> Result<Vec<ColumnData>, ModelError>;

    /// Single-sample query of a fixed provider. Requires
    /// [Capability::ProviderFixed].
    fn exec_fixed(
        &mut self,
        provider: &Handle,
        elements: &[String],
    ) -> Result<Vec<ColumnData>, ModelError>;
}
