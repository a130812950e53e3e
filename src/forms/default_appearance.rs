//! Default appearance (`/DA`) strings.
//!
//! Per PDF spec ISO 32000-1:2008, Section 12.7.3.3, a variable-text field's
//! default appearance is a content-stream fragment such as `/Helv 12 Tf 0 g`.
//! Only the leading font selection is of interest here: the resource name and
//! the size operand of the `Tf` operator.

use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{multispace0, multispace1},
    combinator::opt,
    number::complete::double,
    sequence::{pair, preceded, terminated},
    IResult,
};

/// Font selected by a default appearance string.
#[derive(Debug, Clone, PartialEq)]
pub struct DaFont {
    /// Resource name without the leading slash, e.g. `Helv`
    pub name: String,
    /// Size operand, when followed by `Tf`
    pub size: Option<f64>,
}

/// `/Name` followed by at least one whitespace character.
fn font_name(input: &str) -> IResult<&str, &str> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("/")(input)?;
    terminated(take_till1(|c: char| c.is_whitespace()), multispace1)(input)
}

/// `12 Tf`
fn font_size(input: &str) -> IResult<&str, f64> {
    terminated(double, preceded(multispace1, tag("Tf")))(input)
}

fn font_selection(input: &str) -> IResult<&str, (&str, Option<f64>)> {
    pair(font_name, opt(font_size))(input)
}

/// Parse the font selection at the start of a default appearance string.
///
/// Returns `None` when the string does not start with a name marker, or when
/// the name is not terminated by whitespace. Malformed input never errors.
///
/// ```
/// use pdf_formfix::forms::default_appearance::parse_default_appearance;
///
/// let font = parse_default_appearance("/Helv 12 Tf 0 g").unwrap();
/// assert_eq!(font.name, "Helv");
/// assert_eq!(font.size, Some(12.0));
///
/// assert!(parse_default_appearance("garbage").is_none());
/// ```
pub fn parse_default_appearance(da: &str) -> Option<DaFont> {
    let (_, (name, size)) = font_selection(da).ok()?;
    Some(DaFont {
        name: name.to_string(),
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_size() {
        let font = parse_default_appearance("/TiRo 9.5 Tf").unwrap();
        assert_eq!(font.name, "TiRo");
        assert_eq!(font.size, Some(9.5));
    }

    #[test]
    fn test_leading_whitespace() {
        let font = parse_default_appearance("  \t/Cour 0 Tf").unwrap();
        assert_eq!(font.name, "Cour");
        assert_eq!(font.size, Some(0.0));
    }

    #[test]
    fn test_name_without_size_operator() {
        let font = parse_default_appearance("/Helv 0 g").unwrap();
        assert_eq!(font.name, "Helv");
        assert_eq!(font.size, None);
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert!(parse_default_appearance("garbage").is_none());
        assert!(parse_default_appearance("").is_none());
        assert!(parse_default_appearance("0 g /Helv 12 Tf").is_none());
    }

    #[test]
    fn test_unterminated_name_is_ignored() {
        assert!(parse_default_appearance("/Helv").is_none());
        assert!(parse_default_appearance("/").is_none());
        assert!(parse_default_appearance("/ 12 Tf").is_none());
    }
}
