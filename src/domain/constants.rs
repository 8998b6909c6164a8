/// Sentinel for "no value" in every value-set slot.
pub const UNSET: &str = "-";

pub const MILLIMETRE: &str = "mm";

/// Parameter types treated as physical dimensions by `standardize-dimensions-in-millimeter`.
pub const DIMENSION_PARAMETERS: [&str; 4] = ["d", "h", "l", "wid"];

/// Multiplicative factors that re-express a value of the named scale in millimetre.
pub const FACTORS_TO_MILLIMETRE: [(&str, f64); 7] = [
    ("km", 1_000_000.0),
    ("m", 1000.0),
    ("dm", 100.0),
    ("cm", 10.0),
    ("mm", 1.0),
    ("μm", 0.001),
    ("nm", 0.000_001),
];

pub const GENERIC_EQUIPMENT_PREFIX: &str = "Generic Equipment";

/// Parameter type short name to the domain short name prescribed as its owner
/// on generic equipment.
pub const GENERIC_EQUIPMENT_OWNERS: [(&str, &str); 3] =
    [("P_mean", "PWR"), ("P_duty_cyc", "SYS"), ("loc", "CONF")];

pub const REPORT_FILE_SUFFIX: &str = "_parameters_report.csv";

pub fn factor_to_millimetre(scale_short_name: &str) -> Option<f64> {
    FACTORS_TO_MILLIMETRE
        .iter()
        .find(|(name, _)| *name == scale_short_name)
        .map(|(_, factor)| *factor)
}
