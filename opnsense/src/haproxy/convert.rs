//! Scalar and set conversions between declarative values and the string
//! encodings OPNsense uses on the wire.
//!
//! Integers use -1 as the "unset" sentinel; the `_negative` encoders render
//! exactly that sentinel as the empty string. Booleans are "1"/"0".

use std::collections::BTreeSet;

use super::selected::{ListEncoding, SelectedList};

pub fn bool_to_string(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

/// Only "1" is true. Anything else, including "", is false.
pub fn string_to_bool(s: &str) -> bool {
    s == "1"
}

pub fn int64_to_string(i: i64) -> String {
    i.to_string()
}

pub fn int64_to_string_negative(i: i64) -> String {
    if i == -1 {
        String::new()
    } else {
        i.to_string()
    }
}

/// Unparseable input, including "", becomes -1.
pub fn string_to_int64(s: &str) -> i64 {
    s.parse().unwrap_or(-1)
}

/// Fixed six-decimal rendering, e.g. 1.5 -> "1.500000".
pub fn float64_to_string(f: f64) -> String {
    format!("{:.6}", f)
}

pub fn float64_to_string_negative(f: f64) -> String {
    if f == -1.0 {
        String::new()
    } else {
        float64_to_string(f)
    }
}

/// Unparseable input, including "", becomes -1.
pub fn string_to_float64(s: &str) -> f64 {
    s.parse().unwrap_or(-1.0)
}

pub fn empty_set() -> BTreeSet<String> {
    BTreeSet::new()
}

pub fn preset_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Members in the set's (sorted) enumeration order.
pub fn set_to_string_list(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// Duplicates collapse.
pub fn string_list_to_set(list: &[String]) -> BTreeSet<String> {
    list.iter().cloned().collect()
}

pub fn set_to_selected_list(set: &BTreeSet<String>, encoding: ListEncoding) -> SelectedList {
    SelectedList::new(set_to_string_list(set), encoding)
}

pub fn selected_list_to_set(list: &SelectedList) -> BTreeSet<String> {
    string_list_to_set(list.items())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_encoding() {
        assert_eq!(bool_to_string(true), "1");
        assert_eq!(bool_to_string(false), "0");
        assert!(string_to_bool("1"));
        for s in ["0", "", "true", "yes", "01"] {
            assert!(!string_to_bool(s), "{:?}", s);
        }
    }

    #[test]
    fn only_the_sentinel_renders_empty() {
        assert_eq!(int64_to_string_negative(-1), "");
        assert_eq!(int64_to_string_negative(-42), "-42");
        assert_eq!(string_to_int64(&int64_to_string_negative(-5)), -5);
        assert_eq!(int64_to_string_negative(0), "0");
        assert_eq!(int64_to_string_negative(443), "443");
        assert_eq!(int64_to_string(-1), "-1");
    }

    #[test]
    fn integer_parsing_falls_back_to_sentinel() {
        assert_eq!(string_to_int64(""), -1);
        assert_eq!(string_to_int64("abc"), -1);
        assert_eq!(string_to_int64("8080"), 8080);
        assert_eq!(string_to_int64("-7"), -7);
    }

    #[test]
    fn float_encoding() {
        assert_eq!(float64_to_string(1.5), "1.500000");
        assert_eq!(float64_to_string_negative(-1.0), "");
        assert_eq!(float64_to_string_negative(-0.5), "-0.500000");
        assert_eq!(float64_to_string_negative(0.0), "0.000000");
        assert_eq!(string_to_float64("2.25"), 2.25);
        assert_eq!(string_to_float64(""), -1.0);
    }

    #[test]
    fn sets_enumerate_sorted_and_dedupe() {
        let set = string_list_to_set(&[
            "http11".to_string(),
            "h2".to_string(),
            "http11".to_string(),
        ]);
        assert_eq!(set_to_string_list(&set), vec!["h2", "http11"]);
        assert_eq!(set, preset_set(&["h2", "http11"]));
        assert!(empty_set().is_empty());
    }

    #[test]
    fn selected_list_round_trip_through_set() {
        let set = preset_set(&["h2", "http11"]);
        let list = set_to_selected_list(&set, ListEncoding::CommaJoined);
        assert_eq!(list.items(), ["h2".to_string(), "http11".to_string()]);
        assert_eq!(selected_list_to_set(&list), set);
    }
}
