//! Parser voor airfoil-coördinatenbestanden (`.dat`).
//!
//! De eerste regel bevat de naam van het profiel en wordt genegeerd. Elke
//! volgende regel die uit twee getallen bestaat levert een punt op; andere
//! regels (bv. de puntentellingen van het Lednicer-formaat) worden
//! overgeslagen.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::{ParseError, ParseResult};
use crate::geom::{Point3, Tolerance};

const ROW_PATTERN: &str = r"^\s*(?P<x>[-+]?\d*\.\d+(?:[eE][-+]?\d+)?)\s*,?\s*(?P<y>[-+]?\s*\d*\.\d+(?:[eE][-+]?\d+)?)\s*$";

fn row_regex() -> ParseResult<&'static Regex> {
    static ROW: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    ROW.get_or_init(|| Regex::new(ROW_PATTERN))
        .as_ref()
        .map_err(|err| ParseError::Regex(err.clone()))
}

/// Leest de punten uit de tekst van een airfoilbestand. Een slotpunt dat
/// samenvalt met het eerste punt wordt weggelaten.
pub fn parse_airfoil(text: &str) -> ParseResult<Vec<Point3>> {
    let regex = row_regex()?;
    let mut points = Vec::new();
    for line in text.lines().skip(1) {
        let Some(captures) = regex.captures(line) else {
            continue;
        };
        let x: f64 = captures["x"].parse()?;
        let y: f64 = captures["y"].replace(char::is_whitespace, "").parse()?;
        points.push(Point3::new(x, y, 0.0));
    }

    if points.len() > 1 {
        let first = points[0];
        let last = points[points.len() - 1];
        if first.distance_to(last) <= Tolerance::PROFILE_DUPLICATE.eps {
            points.pop();
        }
    }
    log::debug!("airfoil met {} punten ingelezen", points.len());
    Ok(points)
}

/// Leest en parset een airfoilbestand van schijf.
pub fn read_airfoil(path: impl AsRef<Path>) -> ParseResult<Vec<Point3>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_airfoil(&text)
}

#[cfg(test)]
mod tests {
    use super::parse_airfoil;
    use crate::geom::Point3;

    #[test]
    fn skips_name_and_unmatched_lines() {
        let text = "NACA 0012\n61. 61.\n1.000000 0.001260\n0.5, -0.05\ncommentaar\n.25 -.5e-1\n";
        let points = parse_airfoil(text).expect("geparsed");
        assert_eq!(
            points,
            vec![
                Point3::new(1.0, 0.00126, 0.0),
                Point3::new(0.5, -0.05, 0.0),
                Point3::new(0.25, -0.05, 0.0),
            ]
        );
    }

    #[test]
    fn drops_closing_duplicate() {
        let text = "dup\n1.0 0.0\n0.5 0.1\n0.0 0.0\n0.5 -0.1\n1.0 0.0\n";
        let points = parse_airfoil(text).expect("geparsed");
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn first_line_is_ignored_even_when_numeric() {
        let points = parse_airfoil("0.1 0.2\n0.3 0.4\n").expect("geparsed");
        assert_eq!(points, vec![Point3::new(0.3, 0.4, 0.0)]);
    }

    #[test]
    fn empty_input_gives_no_points() {
        assert!(parse_airfoil("").expect("geparsed").is_empty());
    }

    #[test]
    fn sign_separated_by_space() {
        let points = parse_airfoil("naam\n0.5 - 0.25\n").expect("geparsed");
        assert_eq!(points, vec![Point3::new(0.5, -0.25, 0.0)]);
    }
}
