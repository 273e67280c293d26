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

use crate::model::{AscNodeKind, LocationKind, SizeShapeKind, StateLayout};
use crate::time::Epoch;
use std::fmt;
use typed_builder::TypedBuilder;

/// A geodetic position, unit-explicit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeodeticPosition {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_km: f64,
}

impl fmt::Display for GeodeticPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.4} deg, {:.4} deg, {:.3} km",
            self.lat_deg, self.lon_deg, self.alt_km
        )
    }
}

/// Size and shape of the orbit, in either of the interchangeable
/// parameterizations the engine accepts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SizeShape {
    SemiMajorAxis { sma_km: f64, ecc: f64 },
    MeanMotion { revs_per_day: f64, ecc: f64 },
}

/// Orientation of the ascending node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AscNode {
    Raan { raan_deg: f64 },
    Lan { lan_deg: f64 },
}

/// Position of the vehicle along the orbit at epoch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Location {
    MeanAnomaly { deg: f64 },
    TrueAnomaly { deg: f64 },
}

/// A classical (Keplerian) element set with unit-explicit fields.
///
/// This is a plain value: building or mutating one does nothing to the
/// engine until it is handed to
/// [configure_propagator](crate::session::Session::configure_propagator),
/// which converts, fills and re-assigns the engine-side representation.
#[derive(Copy, Clone, Debug, PartialEq, TypedBuilder)]
pub struct ClassicalElements {
    pub epoch: Epoch,
    pub size_shape: SizeShape,
    pub inc_deg: f64,
    pub aop_deg: f64,
    pub asc_node: AscNode,
    pub location: Location,
}

impl ClassicalElements {
    /// The engine-side layout selectors matching this element set.
    pub(crate) fn layout(&self) -> StateLayout {
        StateLayout {
            size_shape: match self.size_shape {
                SizeShape::SemiMajorAxis { .. } => SizeShapeKind::SemiMajorAxis,
                SizeShape::MeanMotion { .. } => SizeShapeKind::MeanMotion,
            },
            asc_node: match self.asc_node {
                AscNode::Raan { .. } => AscNodeKind::Raan,
                AscNode::Lan { .. } => AscNodeKind::Lan,
            },
            location: match self.location {
                Location::MeanAnomaly { .. } => LocationKind::MeanAnomaly,
                Location::TrueAnomaly { .. } => LocationKind::TrueAnomaly,
            },
        }
    }
}
