//! Point-query sentences for hover/inspect views.

use crate::grid::builder::DamageGrid;
use crate::grid::compare::{CompareMode, ComparisonGrid, ZeroSide};

fn preamble(cdr_percent: u32, seconds: usize) -> String {
    format!(
        "If combat lasts {seconds} seconds,\nand you apply {cdr_percent}% CDR relative to base CD,\n"
    )
}

pub fn describe_damage(grid: &DamageGrid, cdr_percent: u32, seconds: usize) -> Option<String> {
    let value = grid.value_at(cdr_percent, seconds)?;
    Some(format!(
        "{}you can expect this item to deal {value:.2} damage.",
        preamble(cdr_percent, seconds)
    ))
}

pub fn describe_comparison(
    grid: &ComparisonGrid,
    cdr_percent: u32,
    seconds: usize,
    left: &str,
    right: &str,
) -> Option<String> {
    let value = grid.value_at(cdr_percent, seconds)?;
    let verdict = match grid.mode() {
        CompareMode::Absolute => absolute_verdict(value, left, right),
        CompareMode::Relative => {
            relative_verdict(value, grid.zero_side_at(cdr_percent, seconds), left, right)
        }
    };
    Some(format!("{}{verdict}", preamble(cdr_percent, seconds)))
}

fn absolute_verdict(value: f64, left: &str, right: &str) -> String {
    if value > 0.0 {
        format!("{left} will deal {value:.2} more damage than {right}.")
    } else if value < 0.0 {
        format!("{right} will deal {:.2} more damage than {left}.", -value)
    } else {
        "Both weapons will deal the same amount of damage.".to_string()
    }
}

fn relative_verdict(value: f64, zero_side: Option<ZeroSide>, left: &str, right: &str) -> String {
    // A side that dealt nothing loses by an unbounded ratio, whatever sentinel filled the cell.
    match zero_side {
        Some(ZeroSide::Right) => return format!("{left} is infinitely stronger than {right}."),
        Some(ZeroSide::Left) => return format!("{right} is infinitely stronger than {left}."),
        None => {}
    }

    if value == 0.0 {
        "Both weapons are equally strong.".to_string()
    } else if value > 0.0 {
        format!("{left} is {:.2}% stronger than {right}.", value * 100.0)
    } else {
        format!("{right} is {:.2}% stronger than {left}.", value.abs() * 100.0)
    }
}
