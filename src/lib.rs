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

/*! # orrery

Orrery drives external astrodynamics applications through their automation
object model: scenario setup, entity insertion, propagator configuration and
time series extraction, behind one typed session façade. All substantive
computation stays in the driven application; orrery sequences the calls,
keeps the shared unit preference table honest, and reshapes the returned
arrays into tables.
*/

/// The automation object model boundary: capabilities, handles, narrowing,
/// and the trait every backend implements.
pub mod model;

/// The session façade and its typed vocabulary (entities, element sets).
pub mod session;

/// Time series extraction and the immutable tabular result.
pub mod series;

/// The application-wide unit preference table and its scope guards.
pub mod units;

/// Session configuration, loadable from YAML.
pub mod io;

/// A scripted in-process backend for tests, demos and offline work.
pub mod sim;

#[macro_use]
extern crate log;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use nalgebra::base::*;
}

/// Re-export some useful things
pub use self::model::{AutomationModel, Capability, EntityKind, Handle, PropagatorKind};
pub use self::series::SeriesTable;
pub use self::session::{ClassicalElements, Entity, Session, SessionError};
