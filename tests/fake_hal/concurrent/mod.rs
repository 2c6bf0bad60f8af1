use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;

lazy_static! {
    /// Read position of each fake pin, keyed by pin name.
    ///
    /// Pins are read through `&self` and moved into the line under test, so their position is
    /// kept here rather than on the pin.
    static ref DATA_INDICES_MAP: Mutex<HashMap<&'static str, usize>> = Mutex::new(HashMap::new());
}

/// Rewinds (or starts) the pin called `name` at `value`.
pub fn set_named_value(name: &'static str, value: usize) {
    let mut map = DATA_INDICES_MAP.lock().unwrap();
    map.insert(name, value);
}

/// Returns the current read position of `name` and advances it by one.
pub fn get_and_increment_named_value(name: &str) -> usize {
    let mut map = DATA_INDICES_MAP.lock().unwrap();
    let index = map.get_mut(name).unwrap();
    let current = *index;
    *index += 1;
    current
}
