//! Value-unit normalization.
//!
//! One fixed rule: values labelled `"NZD thousands"` are scaled to `"NZD"`.

use rust_decimal::Decimal;

use crate::models::Record;

const NZD_THOUSANDS: &str = "NZD thousands";
const NZD: &str = "NZD";

/// Rewrite known unit/label combinations into canonical form.
pub fn normalize_units(record: &mut Record) {
    if record.value_label.as_deref() != Some(NZD_THOUSANDS) {
        return;
    }

    if let Some(scaled) = record.value.and_then(|v| v.checked_mul(Decimal::from(1000))) {
        record.value = Some(scaled);
        record.value_label = Some(NZD.to_string());
    }
}
