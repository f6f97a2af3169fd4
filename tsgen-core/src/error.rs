/// An error decoding a contract document into a [`Document`][crate::parse::Document].
///
/// The `WithPath` variants carry the location of the offending node,
/// like `paths./pets.get.responses`.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SerdeError {
    #[error(transparent)]
    #[diagnostic(code(tsgen::parse::json))]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    #[diagnostic(code(tsgen::parse::json))]
    JsonWithPath(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error(transparent)]
    #[diagnostic(code(tsgen::parse::yaml))]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    #[diagnostic(code(tsgen::parse::yaml))]
    YamlWithPath(#[from] serde_path_to_error::Error<serde_yaml::Error>),
}
