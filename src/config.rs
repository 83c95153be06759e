//! parsing of user-supplied parser configuration, e.g. from the command line

use lazy_static::lazy_static;
use regex::Regex;

use crate::parser::ParserSettings;

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("precedence override '{0}' is not of the form OP=N")]
    MalformedPrecedence(String),
    #[error("'{0}' is reserved and cannot be a binary operator")]
    ReservedOperator(char),
    #[error("precedence '{0}' is out of range")]
    PrecedenceOutOfRange(String),
    #[error("invalid maximum nesting depth '{0}'")]
    InvalidDepth(String),
}

lazy_static! {
    static ref PRECEDENCE_RE: Regex = Regex::new(r"^(?P<op>\S)=(?P<precedence>[0-9]+)$").unwrap();
}

// characters the lexer gives another meaning, or that delimit expressions
const RESERVED: &str = "(),;#.";

/// parse an `OP=N` precedence override such as `/=40`
pub fn parse_precedence(arg: &str) -> Result<(char, u32), ConfigError> {
    let cap = PRECEDENCE_RE
        .captures(arg)
        .ok_or_else(|| ConfigError::MalformedPrecedence(arg.to_string()))?;

    let op = cap["op"]
        .chars()
        .next()
        .ok_or_else(|| ConfigError::MalformedPrecedence(arg.to_string()))?;
    if op.is_alphanumeric() || RESERVED.contains(op) {
        return Err(ConfigError::ReservedOperator(op));
    }

    let precedence = cap["precedence"]
        .parse()
        .map_err(|_| ConfigError::PrecedenceOutOfRange(cap["precedence"].to_string()))?;
    Ok((op, precedence))
}

/// apply every `OP=N` override in order, later ones win
pub fn apply_overrides<'a>(
    mut settings: ParserSettings,
    overrides: impl IntoIterator<Item = &'a str>,
) -> Result<ParserSettings, ConfigError> {
    for arg in overrides {
        let (op, precedence) = parse_precedence(arg)?;
        settings.set_precedence(op, precedence);
    }
    Ok(settings)
}

pub fn parse_max_depth(text: &str) -> Result<usize, ConfigError> {
    match text.parse() {
        Ok(depth) if depth > 0 => Ok(depth),
        _ => Err(ConfigError::InvalidDepth(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn precedence_overrides() {
        assert_eq!(parse_precedence("/=40"), Ok(('/', 40)));
        assert_eq!(parse_precedence("<=0"), Ok(('<', 0)));
        assert_eq!(
            parse_precedence("+"),
            Err(ConfigError::MalformedPrecedence("+".to_string()))
        );
        assert_eq!(
            parse_precedence("==1="),
            Err(ConfigError::MalformedPrecedence("==1=".to_string()))
        );
        assert_eq!(
            parse_precedence("^=\u{0661}\u{0662}"),
            Err(ConfigError::MalformedPrecedence("^=\u{0661}\u{0662}".to_string()))
        );
        assert_eq!(parse_precedence("a=10"), Err(ConfigError::ReservedOperator('a')));
        assert_eq!(parse_precedence(";=10"), Err(ConfigError::ReservedOperator(';')));
        assert_eq!(
            parse_precedence("^=99999999999"),
            Err(ConfigError::PrecedenceOutOfRange("99999999999".to_string()))
        );
    }

    #[test]
    fn overrides_apply_in_order() {
        let settings =
            apply_overrides(ParserSettings::default(), vec!["/=40", "<=0", "/=5"]).unwrap();
        assert_eq!(settings.operator_precedence.get(&'/'), Some(&5));
        assert_eq!(settings.operator_precedence.get(&'<'), None);
        assert_eq!(settings.operator_precedence.get(&'*'), Some(&40));
    }

    #[test]
    fn max_depth() {
        assert_eq!(parse_max_depth("64"), Ok(64));
        assert_eq!(parse_max_depth("0"), Err(ConfigError::InvalidDepth("0".to_string())));
        assert_eq!(parse_max_depth("-1"), Err(ConfigError::InvalidDepth("-1".to_string())));
    }
}
