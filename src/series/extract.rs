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

use super::{ExtractionError, QuerySnafu, SeriesTable, UnknownElementSnafu};
use crate::model::{timefmt, AutomationModel, Handle};
use crate::time::{Duration, Epoch};
use snafu::prelude::*;

/// Validates that every requested element is exported by the provider,
/// reporting the first invalid entry, without touching the engine further.
fn validate_elements<M: AutomationModel>(
    model: &M,
    provider: &Handle,
    elements: &[String],
) -> Result<(), ExtractionError> {
    ensure!(!elements.is_empty(), super::NoElementsSnafu);
    let known = model.elements_of(provider).context(QuerySnafu)?;
    if let Some(bad) = elements
        .iter()
        .find(|el| !known.iter().any(|k| k.eq_ignore_ascii_case(el)))
    {
        return UnknownElementSnafu {
            provider: provider.to_string(),
            element: bad.clone(),
        }
        .fail();
    }
    Ok(())
}

/// Runs a bounded element query over `[start, stop]` sampled every `step`,
/// and reshapes the engine's reply into a [SeriesTable].
///
/// No interpolation and no unit conversion happen here: values come back
/// exactly as the engine provides them, under whatever unit preferences are
/// active at call time, and the engine's sampling is authoritative for the
/// number of rows.
pub fn extract<M: AutomationModel>(
    model: &mut M,
    provider: &Handle,
    start: Epoch,
    stop: Epoch,
    step: Duration,
    elements: &[String],
) -> Result<SeriesTable, ExtractionError> {
    ensure!(stop > start, super::WindowOrderSnafu { start, stop });
    ensure!(
        step > Duration::ZERO,
        super::StepNotPositiveSnafu { step }
    );
    validate_elements(model, provider, elements)?;

    debug!(
        "extracting {} elements from {provider} over {start} .. {stop} every {step}",
        elements.len()
    );
    let data = model
        .exec_elements(
            provider,
            &timefmt::format_epoch(start),
            &timefmt::format_epoch(stop),
            step.to_seconds(),
            elements,
        )
        .context(QuerySnafu)?;

    SeriesTable::assemble(elements, data)
}

/// Single-sample query of a fixed (time-independent) provider.
pub fn extract_fixed<M: AutomationModel>(
    model: &mut M,
    provider: &Handle,
    elements: &[String],
) -> Result<SeriesTable, ExtractionError> {
    validate_elements(model, provider, elements)?;
    let data = model.exec_fixed(provider, elements).context(QuerySnafu)?;
    SeriesTable::assemble(elements, data)
}
