//! Map and dataset file parsing. The core assumes well-formed inputs; this
//! module is where file syntax is validated.

use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::DVec2;

use swarmdrive_shared::{walls_from_polyline, Map, TrainingExample};

/// Parse a map file.
///
/// Line 1: `start_x, start_y, start_angle_degrees`. Line 2: goal left-top
/// corner. Line 3: goal right-bottom corner. Every remaining line is one
/// point, consecutive points chained into wall segments. Values are
/// comma-separated.
pub fn parse_map(text: &str) -> Result<Map> {
    let records: Vec<Vec<f64>> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            line.split(',')
                .map(|field| {
                    field
                        .trim()
                        .parse::<f64>()
                        .with_context(|| format!("bad number {:?} on line {}", field, idx + 1))
                })
                .collect()
        })
        .collect::<Result<_>>()?;

    if records.len() < 5 {
        bail!(
            "map needs a start line, two goal corners and at least two wall points, got {} lines",
            records.len()
        );
    }

    let start = &records[0];
    if start.len() != 3 {
        bail!("start line must be `x, y, angle`, got {} values", start.len());
    }
    let end_lt = corner(&records[1]).context("goal left-top corner")?;
    let end_rb = corner(&records[2]).context("goal right-bottom corner")?;

    let points: Vec<DVec2> = records[3..]
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            corner(record).with_context(|| format!("wall point {}", idx + 1))
        })
        .collect::<Result<_>>()?;

    Ok(Map {
        start_pos: DVec2::new(start[0], start[1]),
        start_angle: start[2],
        end_lt,
        end_rb,
        walls: walls_from_polyline(&points),
    })
}

fn corner(record: &[f64]) -> Result<DVec2> {
    if record.len() != 2 {
        bail!("expected `x, y`, got {} values", record.len());
    }
    Ok(DVec2::new(record[0], record[1]))
}

/// Parse a training dataset file.
///
/// One example per line, whitespace-separated floats: the last value is the
/// target steering angle in degrees, the three values before it are the
/// (front, right, left) distances. Lines carrying extra leading columns
/// (position-augmented datasets) keep only the last four values.
pub fn parse_dataset(text: &str) -> Result<Vec<TrainingExample>> {
    let mut examples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<f64> = line
            .split_whitespace()
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("bad number {:?} on line {}", field, idx + 1))
            })
            .collect::<Result<_>>()?;

        if values.len() < 4 {
            bail!(
                "line {} has {} values, need at least 3 distances and a target",
                idx + 1,
                values.len()
            );
        }

        let tail = &values[values.len() - 4..];
        examples.push(TrainingExample {
            inputs: [tail[0], tail[1], tail[2]],
            target: tail[3],
        });
    }

    if examples.is_empty() {
        bail!("dataset contains no examples");
    }
    Ok(examples)
}

pub fn load_map(path: &Path) -> Result<Map> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading map {}", path.display()))?;
    parse_map(&text).with_context(|| format!("parsing map {}", path.display()))
}

pub fn load_dataset(path: &Path) -> Result<Vec<TrainingExample>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading dataset {}", path.display()))?;
    parse_dataset(&text).with_context(|| format!("parsing dataset {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP_TEXT: &str = "\
0,0,90
18,40
30,37
-6,-3
-6,22
18,22
18,50
30,50
30,10
";

    #[test]
    fn test_parse_map() {
        let map = parse_map(MAP_TEXT).unwrap();
        assert_eq!(map.start_pos, DVec2::new(0.0, 0.0));
        assert!((map.start_angle - 90.0).abs() < 1e-12);
        assert_eq!(map.end_lt, DVec2::new(18.0, 40.0));
        assert_eq!(map.end_rb, DVec2::new(30.0, 37.0));
        // Six points chain into five segments.
        assert_eq!(map.walls.len(), 5);
        assert_eq!(map.walls[0].a, DVec2::new(-6.0, -3.0));
        assert_eq!(map.walls[4].b, DVec2::new(30.0, 10.0));
    }

    #[test]
    fn test_parse_map_tolerates_blank_lines_and_spaces() {
        let text = "0, 0, 90\n\n18, 40\n30, 37\n-6, -3\n-6, 22\n";
        let map = parse_map(text).unwrap();
        assert_eq!(map.walls.len(), 1);
    }

    #[test]
    fn test_parse_map_rejects_garbage() {
        assert!(parse_map("").is_err());
        assert!(parse_map("0,0,90\n18,40\n30,37\nnot,a number\n1,2\n").is_err());
        // Missing the start angle.
        assert!(parse_map("0,0\n18,40\n30,37\n-6,-3\n-6,22\n").is_err());
    }

    #[test]
    fn test_parse_dataset_three_inputs() {
        let text = "22.0 8.5 8.5 -16.9\n20.2 8.9 6.1 -14.6\n";
        let examples = parse_dataset(text).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].inputs, [22.0, 8.5, 8.5]);
        assert!((examples[0].target + 16.9).abs() < 1e-12);
    }

    #[test]
    fn test_parse_dataset_drops_leading_position_columns() {
        let text = "0.0 0.0 22.0 8.5 8.5 -16.9\n";
        let examples = parse_dataset(text).unwrap();
        assert_eq!(examples[0].inputs, [22.0, 8.5, 8.5]);
        assert!((examples[0].target + 16.9).abs() < 1e-12);
    }

    #[test]
    fn test_parse_dataset_rejects_short_lines() {
        assert!(parse_dataset("1.0 2.0 3.0\n").is_err());
        assert!(parse_dataset("").is_err());
        assert!(parse_dataset("1.0 2.0 x 4.0\n").is_err());
    }
}
