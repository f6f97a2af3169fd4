use std::borrow::Cow;

use miette::SourceSpan;
use winnow::{
    Parser,
    combinator::eof,
    error::{ContextError, ParseError},
};

/// Parses a path template, like `/v1/pets/{petId}/toy`.
///
/// The grammar for path templating is adapted directly from
/// https://spec.openapis.org/oas/v3.2.0.html#x4-8-2-path-templating.
pub fn parse<'a>(input: &'a str) -> Result<Vec<PathSegment<'a>>, BadPath> {
    (self::parser::template, eof)
        .map(|(segments, _)| segments)
        .parse(input)
        .map_err(BadPath::from_parse_error)
}

/// A slash-delimited path segment that contains zero or more
/// template fragments.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathSegment<'input>(Vec<PathFragment<'input>>);

impl<'input> PathSegment<'input> {
    pub fn fragments(&self) -> &[PathFragment<'input>] {
        &self.0
    }

    /// Returns the names of the template parameters in this segment.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|fragment| match fragment {
            PathFragment::Param(name) => Some(name.as_ref()),
            PathFragment::Literal(_) => None,
        })
    }

    /// Detaches this segment from the template string it was parsed from.
    pub fn into_owned(self) -> PathSegment<'static> {
        PathSegment(self.0.into_iter().map(PathFragment::into_owned).collect())
    }
}

/// A fragment within a path segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathFragment<'input> {
    /// Literal text.
    Literal(Cow<'input, str>),
    /// Template parameter name.
    Param(Cow<'input, str>),
}

impl PathFragment<'_> {
    pub fn into_owned(self) -> PathFragment<'static> {
        match self {
            Self::Literal(text) => PathFragment::Literal(Cow::Owned(text.into_owned())),
            Self::Param(name) => PathFragment::Param(Cow::Owned(name.into_owned())),
        }
    }
}

mod parser {
    use super::*;

    use winnow::{
        Parser,
        combinator::{alt, delimited, repeat},
        token::take_while,
    };

    pub fn template<'a>(input: &mut &'a str) -> winnow::Result<Vec<PathSegment<'a>>> {
        alt((
            ('/', segment, template)
                .map(|(_, head, tail)| std::iter::once(head).chain(tail).collect()),
            ('/', segment).map(|(_, segment)| vec![segment]),
            '/'.map(|_| vec![PathSegment::default()]),
        ))
        .parse_next(input)
    }

    fn segment<'a>(input: &mut &'a str) -> winnow::Result<PathSegment<'a>> {
        repeat(1.., fragment).map(PathSegment).parse_next(input)
    }

    fn fragment<'a>(input: &mut &'a str) -> winnow::Result<PathFragment<'a>> {
        alt((param, literal)).parse_next(input)
    }

    pub fn param<'a>(input: &mut &'a str) -> winnow::Result<PathFragment<'a>> {
        delimited('{', take_while(1.., |c| c != '{' && c != '}'), '}')
            .map(|name: &'a str| PathFragment::Param(name.into()))
            .parse_next(input)
    }

    pub fn literal<'a>(input: &mut &'a str) -> winnow::Result<PathFragment<'a>> {
        take_while(1.., |c| {
            matches!(c,
                'A'..='Z' | 'a'..='z' | '0'..='9' |
                '-' | '.' | '_' | '~' | ':' | '@' |
                '!' | '$' | '&' | '\'' | '(' | ')' |
                '*' | '+' | ',' | ';' | '=' | '%'
            )
        })
        .verify_map(|text| {
            percent_encoding::percent_decode_str(text)
                .decode_utf8()
                .ok()
                .map(PathFragment::Literal)
        })
        .parse_next(input)
    }
}

#[derive(Clone, Debug, miette::Diagnostic, thiserror::Error)]
#[error("invalid URL path template `{code}`")]
pub struct BadPath {
    #[source_code]
    code: String,
    #[label]
    span: SourceSpan,
}

impl BadPath {
    fn from_parse_error(error: ParseError<&str, ContextError>) -> Self {
        let input = *error.input();
        Self {
            code: input.to_owned(),
            span: error.char_span().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let result = parse("/").unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].fragments(), &[]);
    }

    #[test]
    fn test_template_params_in_order() {
        let result = parse("/stores/{storeId}/pets/{petId}").unwrap();

        assert_eq!(result.len(), 4);
        let params: Vec<_> = result.iter().flat_map(|segment| segment.params()).collect();
        assert_eq!(params, ["storeId", "petId"]);
    }

    #[test]
    fn test_mixed_literal_and_param() {
        let result = parse("/reports/report-{reportId}.pdf").unwrap();

        assert_eq!(
            result[1].fragments(),
            &[
                PathFragment::Literal("report-".into()),
                PathFragment::Param("reportId".into()),
                PathFragment::Literal(".pdf".into())
            ]
        );
    }

    #[test]
    fn test_percent_encoded_literal() {
        let result = parse("/files/a%20b").unwrap();

        assert_eq!(
            result[1].fragments(),
            &[PathFragment::Literal("a b".into())]
        );
    }

    #[test]
    fn test_into_owned_outlives_input() {
        let owned = {
            let input = String::from("/pets/{petId}");
            parse(&input)
                .unwrap()
                .into_iter()
                .map(PathSegment::into_owned)
                .collect::<Vec<_>>()
        };
        assert_eq!(owned[1].fragments(), &[PathFragment::Param("petId".into())]);
    }

    #[test]
    fn test_double_slash() {
        // Empty path segments aren't allowed.
        assert!(parse("/pets//toys").is_err());
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(parse("/pets/{pet/{id}}").is_err());
        assert!(parse("/pets/{petId").is_err());
    }

    #[test]
    fn test_missing_leading_slash() {
        let err = parse("pets").unwrap_err();
        assert!(err.to_string().contains("`pets`"), "{err}");
    }
}
