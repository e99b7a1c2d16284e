// Property-based tests for undo, find, clipboard and unit conversion.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use gridex_engine::clipboard::{serialize, CopySource, PasteOptions};
use gridex_engine::find::{find, FindDirection, FindOptions};
use gridex_engine::units::{QuantityId, UnitId, UnitRegistry};
use gridex_engine::{CellRange, Matrix, Sheet};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Cell text without line breaks. Quotes and `;` may appear anywhere.
fn arb_cell() -> impl Strategy<Value = String> {
    "[a-z0-9\";]{0,4}"
}

fn arb_rows(min_cols: usize) -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..6, min_cols..6)
        .prop_flat_map(|(rows, cols)| prop::collection::vec(prop::collection::vec(arb_cell(), cols), rows))
}

fn arb_sheet() -> impl Strategy<Value = Sheet> {
    arb_rows(1).prop_map(|data| Sheet::from_rows(&data))
}

/// Drop separators that directly follow a quote. Clipboard text does not
/// escape quotes, so `"` before a separator cannot be told from a closing one.
fn unambiguous(rows: &[Vec<String>], sep: char) -> Vec<Vec<String>> {
    let clean = |cell: &String| {
        let mut out = String::new();
        for ch in cell.chars() {
            if !(ch == sep && out.ends_with('"')) {
                out.push(ch);
            }
        }
        out
    };
    rows.iter().map(|row| row.iter().map(&clean).collect()).collect()
}

/// Single-cell edits as `(row, col, value)`.
fn arb_edits(rows: u32, cols: u32) -> impl Strategy<Value = Vec<(u32, u32, String)>> {
    prop::collection::vec((1..=rows, 1..=cols, arb_cell()), 1..8)
}

proptest! {
    #![proptest_config(config())]

    /// Undo and redo restore the states before and after the edits.
    #[test]
    fn undo_redo_are_inverse(
        (sheet, edits) in arb_sheet().prop_flat_map(|s| {
            let (r, c) = (s.rows(), s.cols());
            (Just(s), arb_edits(r, c))
        })
    ) {
        let before = sheet.to_rows();
        let mut m = Matrix::new(sheet);
        for (row, col, value) in &edits {
            m.set_cell(*row, *col, value);
        }
        let after = m.grid().to_rows();

        let n = m.undo_engine().len();
        prop_assert_eq!(m.undo(n), n);
        prop_assert_eq!(m.grid().to_rows(), before);
        prop_assert_eq!(m.redo(n), n);
        prop_assert_eq!(m.grid().to_rows(), after.clone());

        if n > 0 {
            m.undo(1);
            m.redo(1);
            prop_assert_eq!(m.grid().to_rows(), after);
        }
    }

    /// A new edit after an undo leaves nothing to redo.
    #[test]
    fn new_edit_truncates_redo(sheet in arb_sheet(), value in "[a-z]{1,3}") {
        let mut m = Matrix::new(sheet);
        m.set_cell(1, 1, "first");
        m.set_cell(1, 1, "second");
        m.undo(1);
        prop_assert!(m.undo_engine().can_redo());
        m.set_cell(1, 1, &value);
        prop_assert!(!m.undo_engine().can_redo());
        prop_assert_eq!(m.undo_engine().position(), m.undo_engine().len());
    }

    /// Copy followed by paste into an empty grid of the same shape gives the
    /// same visible cells.
    #[test]
    fn serialize_then_paste_reproduces(rows in arb_rows(1), sep in prop::sample::select(vec!['\t', ';'])) {
        let sheet = Sheet::from_rows(&unambiguous(&rows, sep));
        let (rows, cols) = (sheet.rows(), sheet.cols());
        let text = serialize(&sheet, &CopySource::Range(CellRange::all(rows, cols)), sep, false).unwrap();

        let mut m = Matrix::new(Sheet::new(rows, cols));
        let options = PasteOptions { separator: Some(sep), dimensions: Some((rows, cols)), ..Default::default() };
        prop_assert!(m.paste(&text, &options));
        prop_assert_eq!(m.grid().to_rows(), sheet.to_rows());
    }

    /// The same round trip with the shape and separator left to inference.
    #[test]
    fn serialize_then_default_paste_reproduces(rows in arb_rows(2)) {
        let sheet = Sheet::from_rows(&unambiguous(&rows, '\t'));
        let (rows, cols) = (sheet.rows(), sheet.cols());
        let text = serialize(&sheet, &CopySource::Range(CellRange::all(rows, cols)), '\t', false).unwrap();

        let mut m = Matrix::new(Sheet::new(rows, cols));
        prop_assert!(m.paste(&text, &PasteOptions::default()));
        prop_assert_eq!(m.grid().to_rows(), sheet.to_rows());
    }

    /// Hidden lines are left out of the copy; pasting it gives the visible
    /// part of the source.
    #[test]
    fn hidden_lines_are_not_copied(
        (rows, hidden_rows, hidden_cols) in arb_rows(1).prop_flat_map(|data| {
            let (r, c) = (data.len(), data[0].len());
            (Just(data), prop::collection::vec(any::<bool>(), r), prop::collection::vec(any::<bool>(), c))
        }),
        sep in prop::sample::select(vec!['\t', ';']),
    ) {
        let data = unambiguous(&rows, sep);
        let mut sheet = Sheet::from_rows(&data);
        let (rows, cols) = (sheet.rows(), sheet.cols());
        // the first row and column stay visible
        for (i, &hide) in hidden_rows.iter().enumerate().skip(1) {
            sheet.set_row_hidden(i as u32 + 1, hide);
        }
        for (j, &hide) in hidden_cols.iter().enumerate().skip(1) {
            sheet.set_col_hidden(j as u32 + 1, hide);
        }
        let visible: Vec<Vec<String>> = sheet
            .to_rows()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i == 0 || !hidden_rows[*i])
            .map(|(_, row)| {
                row.into_iter()
                    .enumerate()
                    .filter(|(j, _)| *j == 0 || !hidden_cols[*j])
                    .map(|(_, v)| v)
                    .collect()
            })
            .collect();

        let text = serialize(&sheet, &CopySource::Range(CellRange::all(rows, cols)), sep, false).unwrap();
        let (vr, vc) = (visible.len() as u32, visible[0].len() as u32);
        let mut m = Matrix::new(Sheet::new(vr, vc));
        let options = PasteOptions { separator: Some(sep), dimensions: Some((vr, vc)), ..Default::default() };
        prop_assert!(m.paste(&text, &options));
        prop_assert_eq!(m.grid().to_rows(), visible);
    }

    /// A search for absent text stops and reports nothing, from any cell and
    /// in any direction.
    #[test]
    fn find_terminates_without_match(
        sheet in arb_sheet(),
        dir in prop::sample::select(FindDirection::ALL.to_vec()),
        check in any::<bool>(),
        start in (0u32..7, 0u32..7),
    ) {
        let opts = FindOptions { direction: dir, ..Default::default() };
        prop_assert_eq!(find(&sheet, "#", start, &opts, check), None);
    }

    /// A single match is reached from any start in any direction.
    #[test]
    fn find_reaches_unique_match(
        (sheet, target, start) in arb_sheet().prop_flat_map(|s| {
            let (r, c) = (s.rows(), s.cols());
            (Just(s), (1..=r, 1..=c), (0..=r, 0..=c))
        }),
        dir in prop::sample::select(FindDirection::ALL.to_vec()),
        check in any::<bool>(),
    ) {
        let mut sheet = sheet;
        sheet.set_value(target.0, target.1, "#needle#");
        let opts = FindOptions { direction: dir, ..Default::default() };
        prop_assert_eq!(find(&sheet, "#needle#", start, &opts, check), Some(target));
    }

    /// Converting there and back is the identity for every builtin pair.
    #[test]
    fn unit_round_trip(q_index in 1usize..28, a in 0usize..13, b in 0usize..13, value in -1.0e6f64..1.0e6) {
        let reg = UnitRegistry::new();
        let q = QuantityId(q_index);
        let n = reg.quantity(q).unwrap().units.len();
        let (from, to) = (UnitId(a % n), UnitId(b % n));
        let there = reg.convert(q, value, from, to).unwrap();
        let back = reg.convert(q, there, to, from).unwrap();
        prop_assert!((back - value).abs() <= 1e-6 * value.abs().max(1.0), "{} -> {} -> {}", value, there, back);
    }
}

#[test]
fn temperature_reference_points() {
    let reg = UnitRegistry::new();
    let t = reg.find_quantity("temperature").unwrap();
    let kelvin = reg.find_unit_in(t, "K").unwrap();
    let celsius = reg.find_unit_in(t, "degC").unwrap();
    let fahrenheit = reg.find_unit_in(t, "degF").unwrap();
    assert!((reg.convert(t, 0.0, celsius, kelvin).unwrap() - 273.15).abs() < 1e-9);
    assert!((reg.convert(t, 32.0, fahrenheit, kelvin).unwrap() - 273.15).abs() < 1e-9);
}
