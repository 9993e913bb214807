//! Driver number to short code lookup

use std::collections::BTreeMap;

use crate::types::DriverNumber;

const DEFAULT_CODES: &[(DriverNumber, &str)] = &[
    (1, "NOR"),
    (3, "VER"),
    (5, "BOR"),
    (6, "HAD"),
    (10, "GAS"),
    (11, "PER"),
    (12, "ANT"),
    (14, "ALO"),
    (16, "LEC"),
    (18, "STR"),
    (23, "ALB"),
    (27, "HUL"),
    (30, "LAW"),
    (31, "OCO"),
    (41, "LIN"),
    (43, "COL"),
    (44, "HAM"),
    (55, "SAI"),
    (63, "RUS"),
    (77, "BOT"),
    (81, "PIA"),
    (87, "BEAR"),
];

/// Built-in roster used when the configuration does not override it.
pub fn default_roster() -> BTreeMap<DriverNumber, String> {
    DEFAULT_CODES.iter().map(|&(number, code)| (number, code.to_string())).collect()
}

/// Short display code for a driver, falling back to the bare number.
pub fn format_driver_code(roster: &BTreeMap<DriverNumber, String>, driver: DriverNumber) -> String {
    roster.get(&driver).cloned().unwrap_or_else(|| driver.to_string())
}

/// Picker label, e.g. `HAM #44`.
pub fn picker_label(roster: &BTreeMap<DriverNumber, String>, driver: DriverNumber) -> String {
    format!("{} #{}", format_driver_code(roster, driver), driver)
}

/// Every selectable driver, ascending by number.
pub fn selectable_drivers(roster: &BTreeMap<DriverNumber, String>) -> Vec<DriverNumber> {
    roster.keys().copied().collect()
}
