//! CLI command implementations.

pub(crate) mod css;
pub(crate) mod render;
pub(crate) mod url;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

pub(crate) use css::CssArgs;
pub(crate) use render::RenderArgs;
pub(crate) use url::UrlArgs;

use crate::error::CliError;

/// Diagram text read from a file or stdin.
#[derive(Debug)]
pub(crate) struct Source {
    /// File path, or `<stdin>`.
    pub label: String,
    pub text: String,
}

/// Read one diagram per input. No inputs, or `-`, reads stdin.
pub(crate) fn read_sources(inputs: &[PathBuf]) -> Result<Vec<Source>, CliError> {
    if inputs.is_empty() {
        return Ok(vec![read_source(None)?]);
    }
    inputs.iter().map(|p| read_source(Some(p))).collect()
}

/// Read a single diagram from `input`, or stdin for `None` / `-`.
pub(crate) fn read_source(input: Option<&Path>) -> Result<Source, CliError> {
    match input {
        Some(path) if path != Path::new("-") => Ok(Source {
            label: path.display().to_string(),
            text: std::fs::read_to_string(path)?,
        }),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(Source {
                label: "<stdin>".to_owned(),
                text,
            })
        }
    }
}

/// Write generated text to stdout, one entry per line.
pub(crate) fn write_lines<I, S>(lines: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line.as_ref())?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_read_sources_from_files() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.puml");
        let b = tmp.path().join("b.puml");
        std::fs::write(&a, "@startuml\nA -> B\n@enduml").unwrap();
        std::fs::write(&b, "@startuml\nB -> C\n@enduml").unwrap();

        let sources = read_sources(&[a.clone(), b]).unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].label, a.display().to_string());
        assert_eq!(sources[0].text, "@startuml\nA -> B\n@enduml");
        assert_eq!(sources[1].text, "@startuml\nB -> C\n@enduml");
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Some(Path::new("/nonexistent/a.puml"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
