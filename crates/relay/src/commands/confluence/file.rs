//! `relay confluence file` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use relay_config::Config;
use relay_confluence::Section;
use relay_confluence::extract::extract;

use super::ExtractArgs;
use crate::error::CliError;
use crate::output::{Output, print_json};

/// Arguments for the confluence file command.
#[derive(Args)]
pub(crate) struct FileArgs {
    /// Path to a file containing a storage-format page body.
    path: PathBuf,

    #[command(flatten)]
    extract: ExtractArgs,
}

impl FileArgs {
    /// Execute the file command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or extracted.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(config_path, Some(&self.extract.cli_settings(None)))?;

        let sections = self.sections(&config)?;
        output.success(&format!(
            "Extracted {} sections from {}",
            sections.len(),
            self.path.display()
        ));
        print_json(&sections)
    }

    fn sections(&self, config: &Config) -> Result<Vec<Section>, CliError> {
        let html = std::fs::read_to_string(&self.path)?;
        let options = self.extract.section_options(&config.extract);
        Ok(extract(&html, config.extract.mode, &options)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use relay_config::ExtractMode;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_sections_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<p>Intro</p><h2>Setup</h2><p>Run <code>make</code>.</p>").unwrap();

        let args = FileArgs {
            path: file.path().to_path_buf(),
            extract: ExtractArgs {
                title: Some("Guide".to_owned()),
                ..Default::default()
            },
        };
        let mut config = Config::default();
        config.extract.mode = ExtractMode::Markdown;

        let sections = args.sections(&config).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Guide");
        assert_eq!(sections[1].hierarchy, "Guide -> Setup");
        assert_eq!(sections[1].content, "Run `make`.");
    }

    #[test]
    fn test_missing_file() {
        let args = FileArgs {
            path: PathBuf::from("/nonexistent/page.xml"),
            extract: ExtractArgs::default(),
        };
        let result = args.sections(&Config::default());
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
