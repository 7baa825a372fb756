use crate::error::ParseError;
use geo::Point;

const POINT_OPEN: &str = "<Point><coordinates>";
const POINT_CLOSE: &str = "</coordinates></Point>";

pub fn strip_wrappers(raw: &str) -> String {
    raw.replace(POINT_OPEN, "").replace(POINT_CLOSE, "")
}

// Only the first comma splits; anything after it belongs to the latitude.
pub fn parse_geometry(raw: &str) -> Result<Point<f64>, ParseError> {
    let stripped = strip_wrappers(raw);
    let (lon, lat) = stripped
        .split_once(',')
        .ok_or_else(|| ParseError::MissingComma(stripped.clone()))?;

    Ok(Point::new(
        parse_coordinate("longitude", lon)?,
        parse_coordinate("latitude", lat)?,
    ))
}

fn parse_coordinate(field: &'static str, token: &str) -> Result<f64, ParseError> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_point() {
        let p = parse_geometry("<Point><coordinates>-0.136,51.513</coordinates></Point>").unwrap();
        assert_eq!(p.x(), -0.136);
        assert_eq!(p.y(), 51.513);
    }

    #[test]
    fn wrappers_are_optional() {
        assert_eq!(parse_geometry("-0.1,51.5").unwrap(), Point::new(-0.1, 51.5));
        assert_eq!(
            parse_geometry("<Point><coordinates>-0.1,51.5").unwrap(),
            Point::new(-0.1, 51.5)
        );
        assert_eq!(
            parse_geometry("-0.1,51.5</coordinates></Point>").unwrap(),
            Point::new(-0.1, 51.5)
        );
    }

    #[test]
    fn stripping_removes_every_occurrence() {
        let raw = "</coordinates></Point><Point><coordinates>1,2<Point><coordinates>";
        assert_eq!(strip_wrappers(raw), "1,2");
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        assert_eq!(parse_geometry(" -0.2 , 51.4 ").unwrap(), Point::new(-0.2, 51.4));
    }

    #[test]
    fn splits_on_first_comma_only() {
        // The remainder "51.5,0" is the latitude token and is not a number.
        let err = parse_geometry("<Point><coordinates>-0.1,51.5,0</coordinates></Point>").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                field: "latitude",
                value: "51.5,0".to_string()
            }
        );
    }

    #[test]
    fn missing_comma_is_an_error() {
        let err = parse_geometry("<Point><coordinates>-0.1</coordinates></Point>").unwrap_err();
        assert_eq!(err, ParseError::MissingComma("-0.1".to_string()));
    }

    #[test]
    fn non_numeric_longitude_is_an_error() {
        let err = parse_geometry("west,51.5").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "longitude", .. }));
    }

    #[test]
    fn empty_latitude_is_an_error() {
        assert!(matches!(
            parse_geometry("-0.1,"),
            Err(ParseError::InvalidNumber { field: "latitude", .. })
        ));
    }
}
