//! Row lookup and balance summation over raw Sheets values.
//!
//! Cells arrive as JSON values read with `UNFORMATTED_VALUE`, so numeric cells
//! are JSON numbers and everything typed as text stays a string. Column
//! semantics beyond "partner code in column A" are not enforced: every
//! numeric cell after column A counts toward the balance.
//!
//! Amounts typed into the sheet as text (`"150"`, or a cell formatted as
//! plain text) are not counted. Rows appended by the bot are written RAW, so
//! a phone number in the contact column stays text and never adds to a balance.

use serde_json::Value;

/// Renders a column-A cell the way a partner code is written.
///
/// Whole numbers lose their fractional part so a code stored as
/// `1454702347` (number) matches `"1454702347"`.
pub fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| if f.fract() == 0.0 { format!("{:.0}", f) } else { f.to_string() })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_partner_row(row: &[Value], partner_code: &str) -> bool {
    row.first()
        .and_then(cell_text)
        .is_some_and(|code| code == partner_code)
}

/// First row whose column A equals `partner_code`.
pub fn find_row<'a>(rows: &'a [Vec<Value>], partner_code: &str) -> Option<&'a [Value]> {
    rows.iter().find(|row| is_partner_row(row, partner_code)).map(Vec::as_slice)
}

/// Sum of the numeric cells of a row, column A excluded.
pub fn row_balance(row: &[Value]) -> f64 {
    // fold from +0.0: `sum` of no items is -0.0, which formats as "-0.00"
    row.iter().skip(1).filter_map(Value::as_f64).fold(0.0, |acc, v| acc + v)
}

/// Balance for a partner code, `0.0` when the code has no row.
pub fn balance_for(rows: &[Vec<Value>], partner_code: &str) -> f64 {
    find_row(rows, partner_code).map(row_balance).unwrap_or(0.0)
}

/// Number of non-empty column-A cells below the header row.
pub fn partner_count(rows: &[Vec<Value>]) -> usize {
    rows.iter()
        .skip(1)
        .filter(|row| row.first().and_then(cell_text).is_some_and(|code| !code.is_empty()))
        .count()
}
