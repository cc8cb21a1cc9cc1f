// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length tolerance shared by every geometric predicate.

/// Maximum distance, in model units, at which two positions are considered
/// coincident.
///
/// Point classification uses this one value for the distance to the loop
/// plane, to a loop vertex and to a loop edge.
pub const TOLERANCE: f64 = 1.0e-6;
