use std::fmt;

use crate::intent::Intent;

#[derive(Debug)]
pub struct ScriptError {
    pub line: usize,
    pub source: serde_json::Error,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "intent script line {}: {}", self.line, self.source)
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Parses a JSON-lines intent script. Blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<Intent>, ScriptError> {
    let mut intents = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let intent = serde_json::from_str(line).map_err(|source| ScriptError {
            line: idx + 1,
            source,
        })?;
        intents.push(intent);
    }
    Ok(intents)
}

#[cfg(test)]
mod tests {
    use super::parse_script;
    use crate::intent::Intent;
    use pretty_assertions::assert_eq;

    #[test]
    fn skips_blank_lines_and_comments() {
        let script = concat!(
            "# warm up\n",
            "{\"type\":\"timeline_click\",\"year\":1999}\n",
            "\n",
            "{\"type\":\"play\"}\n"
        );
        assert_eq!(
            parse_script(script).unwrap(),
            vec![Intent::TimelineClick { year: 1999 }, Intent::Play]
        );
    }

    #[test]
    fn reports_the_failing_line() {
        let err = parse_script("{\"type\":\"play\"}\n{\"type\":\"rewind\"}").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.to_string().starts_with("intent script line 2:"));
    }
}
