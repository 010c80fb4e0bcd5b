// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Date formatting helpers.

use chrono::NaiveDate;

/// Format a date as `YYYY-MM-DD` for use in work-directory names.
pub fn datestamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datestamp_pads_components() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap();
        assert_eq!(datestamp(date), "2018-01-05");
    }
}
