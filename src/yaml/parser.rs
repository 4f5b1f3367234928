//! YAML parsing with error handling

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &std::path::Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::outcome::OutcomeDraft;
    use crate::entities::classification::OutcomeType;

    #[test]
    fn test_parse_outcome_draft() {
        let yaml = "tipos: [orientacao, treinamento]\njustificativa: Treinamento realizado\n";
        let draft: OutcomeDraft = parse_yaml(yaml, "outcome.yaml").unwrap();
        assert_eq!(draft.tipos.len(), 2);
        assert!(draft.tipos.contains(&OutcomeType::Treinamento));
    }

    #[test]
    fn test_json_is_accepted() {
        let json = r#"{"tipos": ["improcedente"], "justificativa": "Sem fundamento"}"#;
        let draft: OutcomeDraft = parse_yaml(json, "outcome.json").unwrap();
        assert!(draft.is_unfounded_only());
    }

    #[test]
    fn test_unknown_enum_value_returns_error() {
        let yaml = "tipos: [desconhecido]\njustificativa: x\n";
        let result: Result<OutcomeDraft, _> = parse_yaml(yaml, "outcome.yaml");
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }
}
