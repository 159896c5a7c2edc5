// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use shiftbook_domain::{ProductSale, Shift};
use time::{Date, PrimitiveDateTime};

/// A command represents caller intent as data only.
///
/// Commands are the only way to request shift changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a complete shift in one step.
    CreateShift {
        /// Business date.
        shift_date: Date,
        /// Clock-in wall time.
        clock_in: PrimitiveDateTime,
        /// Clock-out wall time.
        clock_out: PrimitiveDateTime,
        /// Per-product sales.
        product_sales: Vec<ProductSale>,
    },
    /// Record a clock-in; the shift stays open until closed.
    OpenShift {
        /// Business date.
        shift_date: Date,
        /// Clock-in wall time.
        clock_in: PrimitiveDateTime,
    },
    /// Record clock-out and sales for an open shift.
    CloseShift {
        /// The open shift.
        shift_id: i64,
        /// Clock-out wall time.
        clock_out: PrimitiveDateTime,
        /// Per-product sales.
        product_sales: Vec<ProductSale>,
    },
    /// Correct inputs of a closed shift.
    AmendShift {
        /// The closed shift.
        shift_id: i64,
        /// Fields to change.
        changes: ShiftAmendment,
    },
}

impl Command {
    /// Date whose history and tier data the transition needs.
    ///
    /// For close and amend this depends on the existing shift.
    #[must_use]
    pub fn effective_date(&self, existing: Option<&Shift>) -> Option<Date> {
        match self {
            Self::CreateShift { shift_date, .. } | Self::OpenShift { shift_date, .. } => {
                Some(*shift_date)
            }
            Self::CloseShift { .. } => existing.map(|s| s.shift_date),
            Self::AmendShift { changes, .. } => changes
                .shift_date
                .or_else(|| existing.map(|s| s.shift_date)),
        }
    }

    /// The existing shift this command operates on, if any.
    #[must_use]
    pub const fn target_shift_id(&self) -> Option<i64> {
        match self {
            Self::CreateShift { .. } | Self::OpenShift { .. } => None,
            Self::CloseShift { shift_id, .. } | Self::AmendShift { shift_id, .. } => {
                Some(*shift_id)
            }
        }
    }
}

/// Changes to a closed shift. `None` leaves a field as it is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShiftAmendment {
    /// Corrected business date.
    pub shift_date: Option<Date>,
    /// Corrected clock-in.
    pub clock_in: Option<PrimitiveDateTime>,
    /// Corrected clock-out.
    pub clock_out: Option<PrimitiveDateTime>,
    /// Replacement product lines.
    pub product_sales: Option<Vec<ProductSale>>,
}

impl ShiftAmendment {
    /// Whether the amendment changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shift_date.is_none()
            && self.clock_in.is_none()
            && self.clock_out.is_none()
            && self.product_sales.is_none()
    }
}
